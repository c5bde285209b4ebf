//! Generation knobs.
//!
//! Field names follow the host's camelCase settings object, so a settings
//! JSON blob deserializes directly. Missing fields take their defaults.

use serde::{Deserialize, Serialize};

use crate::error::GenError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenConfig {
    pub seed: u64,

    // Spawn scale
    pub hub_count: u32,
    pub ants_per_hub: u32,
    pub spawn_intensity: f64,

    // Steering
    pub ant_speed: f64,
    pub ant_turn_speed: f64,
    pub ant_wander_intensity: f64,
    pub ant_max_life: f64,
    pub ant_trail_distance: f64,
    pub attraction_radius: f64,
    pub collision_distance: f64,
    pub steps_per_tick: u32,

    // Snap thresholds per stage
    pub ant_snap_distance: f64,
    pub ant_subdivide_snap: f64,
    pub cleanup_snap: f64,
    pub subdivide_snap: f64,

    // Area policy
    pub merge_area_threshold: f64,
    pub min_subdivision_area: f64,
    pub max_subdivision_area: f64,
    pub arterial_angle_threshold: f64,

    // Behaviour-specific spawn policy
    pub carrier_count: u32,
    pub carrier_fork_spacing: f64,
    pub carrier_min_distance: f64,
    pub ring_road_probability: f64,
    pub ring_road_radius_multiplier: f64,
    pub bridge_probability: f64,
    pub max_bridge_length: f64,

    // Lots
    pub lot_spacing: f64,
    pub lot_ratio_min: f64,
    pub lot_ratio_max: f64,
    pub lot_warp: f64,
    pub lot_relax_passes: u32,

    // Environment
    pub flow_field_influence: f64,
    pub terrain_water_level: f64,
    pub slope_sensitivity: f64,
}

impl Default for GenConfig {
    fn default() -> Self {
        GenConfig {
            seed: 1,
            hub_count: 5,
            ants_per_hub: 6,
            spawn_intensity: 1.0,
            ant_speed: 2.0,
            ant_turn_speed: 0.03,
            ant_wander_intensity: 0.3,
            ant_max_life: 600.0,
            ant_trail_distance: 10.0,
            attraction_radius: 40.0,
            collision_distance: 4.0,
            steps_per_tick: 4,
            ant_snap_distance: 6.0,
            ant_subdivide_snap: 4.0,
            cleanup_snap: 3.0,
            subdivide_snap: 3.0,
            merge_area_threshold: 400.0,
            min_subdivision_area: 800.0,
            max_subdivision_area: 12_000.0,
            arterial_angle_threshold: 45.0,
            carrier_count: 2,
            carrier_fork_spacing: 80.0,
            carrier_min_distance: 200.0,
            ring_road_probability: 0.3,
            ring_road_radius_multiplier: 1.5,
            bridge_probability: 0.3,
            max_bridge_length: 150.0,
            lot_spacing: 25.0,
            lot_ratio_min: 1.2,
            lot_ratio_max: 2.0,
            lot_warp: 0.15,
            lot_relax_passes: 2,
            flow_field_influence: 0.3,
            terrain_water_level: 0.3,
            slope_sensitivity: 10.0,
        }
    }
}

fn check(param: &str, v: f64, min: f64, max: f64) -> Result<(), GenError> {
    if !v.is_finite() {
        return Err(GenError::non_finite(param));
    }
    if v < min || v > max {
        return Err(GenError::out_of_range(param, min, max, v));
    }
    Ok(())
}

fn check_count(param: &str, v: u32, min: u32, max: u32) -> Result<(), GenError> {
    check(param, v as f64, min as f64, max as f64)
}

impl GenConfig {
    pub fn validate(&self) -> Result<(), GenError> {
        check_count("hubCount", self.hub_count, 0, 64)?;
        check_count("antsPerHub", self.ants_per_hub, 0, 128)?;
        check("spawnIntensity", self.spawn_intensity, 0.0, 10.0)?;
        check("antSpeed", self.ant_speed, 0.01, 100.0)?;
        check("antTurnSpeed", self.ant_turn_speed, 0.0, 1.0)?;
        check("antWanderIntensity", self.ant_wander_intensity, 0.0, 10.0)?;
        check("antMaxLife", self.ant_max_life, 1.0, 100_000.0)?;
        check("antTrailDistance", self.ant_trail_distance, 0.1, 1_000.0)?;
        check("attractionRadius", self.attraction_radius, 0.0, 10_000.0)?;
        check("collisionDistance", self.collision_distance, 0.0, 1_000.0)?;
        check_count("stepsPerTick", self.steps_per_tick, 1, 1_000)?;
        check("antSnapDistance", self.ant_snap_distance, 0.0, 1_000.0)?;
        check("antSubdivideSnap", self.ant_subdivide_snap, 0.0, 1_000.0)?;
        check("cleanupSnap", self.cleanup_snap, 0.0, 1_000.0)?;
        check("subdivideSnap", self.subdivide_snap, 0.0, 1_000.0)?;
        check("mergeAreaThreshold", self.merge_area_threshold, 0.0, 1e12)?;
        check("minSubdivisionArea", self.min_subdivision_area, 0.0, 1e12)?;
        check("maxSubdivisionArea", self.max_subdivision_area, self.min_subdivision_area, 1e12)?;
        check("arterialAngleThreshold", self.arterial_angle_threshold, 0.0, 180.0)?;
        check_count("carrierCount", self.carrier_count, 0, 256)?;
        check("carrierForkSpacing", self.carrier_fork_spacing, 1.0, 100_000.0)?;
        check("carrierMinDistance", self.carrier_min_distance, 0.0, 1e7)?;
        check("ringRoadProbability", self.ring_road_probability, 0.0, 1.0)?;
        check("ringRoadRadiusMultiplier", self.ring_road_radius_multiplier, 0.0, 100.0)?;
        check("bridgeProbability", self.bridge_probability, 0.0, 1.0)?;
        check("maxBridgeLength", self.max_bridge_length, 0.0, 1e6)?;
        check("lotSpacing", self.lot_spacing, 1.0, 10_000.0)?;
        check("lotRatioMin", self.lot_ratio_min, 0.1, 100.0)?;
        check("lotRatioMax", self.lot_ratio_max, self.lot_ratio_min, 100.0)?;
        check("lotWarp", self.lot_warp, 0.0, 1.0)?;
        check_count("lotRelaxPasses", self.lot_relax_passes, 0, 32)?;
        check("flowFieldInfluence", self.flow_field_influence, 0.0, 10.0)?;
        check("terrainWaterLevel", self.terrain_water_level, 0.0, 1.0)?;
        check("slopeSensitivity", self.slope_sensitivity, 0.0, 1e6)?;
        Ok(())
    }

    /// Parse a camelCase settings object and validate it.
    pub fn from_json_str(s: &str) -> Result<GenConfig, GenError> {
        let cfg: GenConfig = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_value(v: serde_json::Value) -> Result<GenConfig, GenError> {
        let cfg: GenConfig = serde_json::from_value(v)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Agents per hub after scaling.
    pub fn scaled(&self, base: u32) -> usize {
        (base as f64 * self.spawn_intensity).round().max(0.0) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(GenConfig::default().validate(), Ok(()));
    }

    #[test]
    fn camel_case_fields_and_defaults() {
        let cfg = GenConfig::from_json_str(r#"{"hubCount": 3, "antSnapDistance": 2.5}"#).unwrap();
        assert_eq!(cfg.hub_count, 3);
        assert_eq!(cfg.ant_snap_distance, 2.5);
        assert_eq!(cfg.cleanup_snap, GenConfig::default().cleanup_snap);
    }

    #[test]
    fn rejects_out_of_range_and_bad_json() {
        let err = GenConfig::from_json_str(r#"{"ringRoadProbability": 1.5}"#).unwrap_err();
        assert_eq!(err.code(), "out_of_range");
        assert!(matches!(GenConfig::from_json_str("{"), Err(GenError::Parse(_))));
        let cfg = GenConfig { terrain_water_level: f64::NAN, ..GenConfig::default() };
        assert_eq!(cfg.validate(), Err(GenError::non_finite("terrainWaterLevel")));
    }

    #[test]
    fn max_area_must_not_undercut_min() {
        let cfg = GenConfig { min_subdivision_area: 500.0, max_subdivision_area: 100.0, ..GenConfig::default() };
        assert_eq!(cfg.validate().unwrap_err().code(), "out_of_range");
    }
}
