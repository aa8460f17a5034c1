//! Per-node renderer configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::Result;
use crate::math::{Aabb, Range};

/// Rendering parameters of one cluster node.
///
/// Assigned externally when the node joins the cluster and constant for the
/// lifetime of the process unless reconfigured.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Depth slab this node renders; `Range::ALL` for sort-first setups
    pub assigned_range: Range,
    /// Coarsest level the selector may accept
    pub min_lod: u32,
    /// Finest level the selector may descend to
    pub max_lod: u32,
    /// Screen-space error budget in pixels
    pub screen_space_error: f32,
    /// World size of one finest-level voxel
    pub world_space_per_voxel: f32,
    pub viewport_height_px: u32,
    /// Block on data loading instead of redrawing when data arrives
    pub synchronous_mode: bool,
    /// Dot products inside this band around zero count as ambiguous when
    /// splitting the compositing order
    pub order_epsilon: f32,
    /// Frame-number step per rendered frame (0 = still image)
    pub animation: i32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            assigned_range: Range::ALL,
            min_lod: 0,
            max_lod: u32::MAX,
            screen_space_error: 4.0,
            world_space_per_voxel: 2.0 / 1024.0,
            viewport_height_px: 1080,
            synchronous_mode: false,
            order_epsilon: 1e-4,
            animation: 0,
        }
    }
}

impl NodeConfig {
    /// Check value ranges, returning the first problem found
    pub fn validate(&self) -> Result<()> {
        if !self.assigned_range.is_valid() {
            return Err(Error::Config(format!(
                "assigned range {} must be a non-empty interval inside [0, 1]",
                self.assigned_range
            )));
        }
        if self.min_lod > self.max_lod {
            return Err(Error::Config(format!(
                "min_lod {} exceeds max_lod {}",
                self.min_lod, self.max_lod
            )));
        }
        if !(self.screen_space_error > 0.0) {
            return Err(Error::Config(format!(
                "screen_space_error must be positive, got {}",
                self.screen_space_error
            )));
        }
        if !(self.world_space_per_voxel > 0.0) {
            return Err(Error::Config(format!(
                "world_space_per_voxel must be positive, got {}",
                self.world_space_per_voxel
            )));
        }
        if self.viewport_height_px == 0 {
            return Err(Error::Config("viewport_height_px must be non-zero".into()));
        }
        if self.order_epsilon < 0.0 {
            return Err(Error::Config("order_epsilon must not be negative".into()));
        }
        Ok(())
    }

    /// Save to file as pretty JSON
    pub fn save_sync(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load from file and validate
    pub fn load_sync(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: NodeConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }
}

/// Static description of the loaded volume, shared by all nodes
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeInfo {
    /// Octree levels below the root
    pub depth: u32,
    /// Finest-level voxels along the longest edge
    pub voxels_per_side: u32,
    pub world_min: [f32; 3],
    pub world_max: [f32; 3],
    /// First and last data frame, inclusive
    pub frames: [u32; 2],
}

impl Default for VolumeInfo {
    fn default() -> Self {
        Self {
            depth: 5,
            voxels_per_side: 1024,
            world_min: [-1.0; 3],
            world_max: [1.0; 3],
            frames: [0, 0],
        }
    }
}

impl VolumeInfo {
    pub fn world_box(&self) -> Aabb {
        Aabb::new(self.world_min.into(), self.world_max.into())
    }

    /// World size of one finest-level voxel
    pub fn world_space_per_voxel(&self) -> f32 {
        self.world_box().size().max_element() / self.voxels_per_side.max(1) as f32
    }

    pub fn validate(&self) -> Result<()> {
        if self.world_box().is_empty() {
            return Err(Error::Config(format!(
                "volume box {:?}..{:?} is empty",
                self.world_min, self.world_max
            )));
        }
        if self.voxels_per_side == 0 {
            return Err(Error::Config("voxels_per_side must be non-zero".into()));
        }
        if self.depth > 20 {
            return Err(Error::Config(format!("octree depth {} is too deep", self.depth)));
        }
        if self.frames[0] > self.frames[1] {
            return Err(Error::Config(format!(
                "frame range {}..{} is inverted",
                self.frames[0], self.frames[1]
            )));
        }
        Ok(())
    }

    /// Save to file as pretty JSON
    pub fn save_sync(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load from file and validate
    pub fn load_sync(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let info: VolumeInfo = serde_json::from_str(&json)?;
        info.validate()?;
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = NodeConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.assigned_range.is_all());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = NodeConfig::default();
        config.assigned_range = Range::new(0.6, 0.4);
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = NodeConfig::default();
        config.min_lod = 5;
        config.max_lod = 2;
        assert!(config.validate().is_err());

        let mut config = NodeConfig::default();
        config.screen_space_error = 0.0;
        assert!(config.validate().is_err());

        let mut config = NodeConfig::default();
        config.viewport_height_px = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nodes").join("node1.json");

        let config = NodeConfig {
            assigned_range: Range::new(0.25, 0.5),
            min_lod: 1,
            max_lod: 6,
            synchronous_mode: true,
            ..Default::default()
        };
        config.save_sync(&path).unwrap();

        let loaded = NodeConfig::load_sync(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: NodeConfig =
            serde_json::from_str(r#"{ "assigned_range": { "start": 0.5, "end": 1.0 } }"#).unwrap();
        assert_eq!(config.assigned_range, Range::new(0.5, 1.0));
        assert_eq!(config.screen_space_error, NodeConfig::default().screen_space_error);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{ "min_lod": 9, "max_lod": 1 }"#).unwrap();
        assert!(matches!(NodeConfig::load_sync(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_volume_info_defaults() {
        let info = VolumeInfo::default();
        assert!(info.validate().is_ok());
        assert_eq!(info.world_box(), Aabb::unit_centered());
        assert_eq!(info.world_space_per_voxel(), 2.0 / 1024.0);
    }

    #[test]
    fn test_volume_info_round_trip_and_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("volume.json");
        let info = VolumeInfo {
            depth: 3,
            frames: [2, 9],
            ..Default::default()
        };
        info.save_sync(&path).unwrap();
        assert_eq!(VolumeInfo::load_sync(&path).unwrap(), info);

        let inverted = VolumeInfo {
            frames: [5, 1],
            ..Default::default()
        };
        assert!(matches!(inverted.validate(), Err(Error::Config(_))));

        let flat = VolumeInfo {
            world_max: [1.0, 1.0, -1.0],
            ..Default::default()
        };
        assert!(flat.validate().is_err());
    }
}
