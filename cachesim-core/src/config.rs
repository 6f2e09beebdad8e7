//! 缓存配置
//!
//! 用一次性传入的配置结构代替交互式输入，支持 TOML 与 JSON。
//!
//! ```toml
//! main_memory_size = 65536
//! cache_size = 1024
//! block_size = 64
//! mapping = "set_associative"
//! associativity = 4
//! seed = 42
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geometry::{CacheGeometry, MappingKind};
use crate::model::CacheModel;

/// 缓存模拟配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// 主存大小（字节）
    pub main_memory_size: u64,
    /// 缓存大小（字节）
    pub cache_size: u64,
    /// 块大小（字节）
    pub block_size: u64,
    /// 映射方式
    #[serde(default)]
    pub mapping: MappingKind,
    /// 关联度（仅组相联需要）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associativity: Option<u32>,
    /// 随机替换种子，缺省时使用熵源
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            main_memory_size: 64 * 1024,
            cache_size: 1024,
            block_size: 64,
            mapping: MappingKind::DirectMapped,
            associativity: None,
            seed: None,
        }
    }
}

impl CacheConfig {
    /// 从 TOML 字符串加载配置
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(format!("TOML parse error: {}", e)))
    }

    /// 从 JSON 字符串加载配置
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json)
            .map_err(|e| ConfigError::Parse(format!("JSON parse error: {}", e)))
    }

    /// 验证配置并推导几何结构
    pub fn build_geometry(&self) -> Result<CacheGeometry, ConfigError> {
        CacheGeometry::new(
            self.cache_size,
            self.block_size,
            self.mapping,
            self.main_memory_size,
            self.associativity,
        )
    }

    /// 构建缓存模型（有种子时可复现）
    pub fn build_model(&self) -> Result<CacheModel, ConfigError> {
        let geometry = self.build_geometry()?;
        Ok(match self.seed {
            Some(seed) => CacheModel::with_seed(geometry, seed),
            None => CacheModel::new(geometry),
        })
    }
}
