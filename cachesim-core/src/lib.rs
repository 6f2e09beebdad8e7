//! cachesim-core: 可配置的高速缓存模拟核心
//!
//! 包含缓存几何结构（地址拆分为 tag / set / offset）、块数组查找、
//! 未命中填充以及随机替换策略。核心不做任何 I/O，所有输出均以结构化
//! 结果返回给调用方。
//!
//! ## 使用示例
//!
//! ```rust
//! use cachesim_core::{AccessResult, CacheGeometry, CacheModel, MappingKind};
//!
//! let geometry = CacheGeometry::new(1024, 64, MappingKind::DirectMapped, 65536, None)?;
//! let mut cache = CacheModel::with_seed(geometry, 42);
//!
//! assert!(matches!(cache.access(0x0), AccessResult::MissFilled { .. }));
//! assert!(matches!(cache.access(0x0), AccessResult::Hit { .. }));
//! assert_eq!(cache.counters().hits, 1);
//! # Ok::<(), cachesim_core::ConfigError>(())
//! ```

pub mod block;
pub mod config;
pub mod error;
pub mod geometry;
pub mod model;
pub mod replacement;

pub use block::{BlockState, CacheBlock};
pub use config::CacheConfig;
pub use error::ConfigError;
pub use geometry::{AddressParts, CacheGeometry, MAX_MAIN_MEMORY_SIZE, MappingKind};
pub use model::{AccessResult, CacheCounters, CacheModel};
pub use replacement::{RandomReplacement, ReplacementPolicy};
