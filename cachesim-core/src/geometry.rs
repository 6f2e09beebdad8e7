//! 缓存几何结构
//!
//! 根据缓存大小、块大小、映射方式与主存大小推导组数、关联度以及
//! offset / index / tag 三个字段的位宽，并负责地址拆分。
//!
//! 三种映射方式共用同一套拆分公式：
//!
//! | 映射方式 | 关联度 | 组数 |
//! |---------|-------|------|
//! | 直接映射 | 1 | 块数 |
//! | 组相联 | 用户指定 | 块数 / 关联度 |
//! | 全相联 | 块数 | 1 |

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 主存大小上限：地址为 `u32`，可寻址 4 GiB
pub const MAX_MAIN_MEMORY_SIZE: u64 = 1 << 32;

/// 映射方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingKind {
    /// 直接映射（每组 1 路）
    #[default]
    #[serde(rename = "direct", alias = "direct_mapped")]
    DirectMapped,
    /// 组相联
    #[serde(alias = "set")]
    SetAssociative,
    /// 全相联（只有 1 组）
    #[serde(alias = "full")]
    FullyAssociative,
}

impl fmt::Display for MappingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingKind::DirectMapped => write!(f, "direct-mapped"),
            MappingKind::SetAssociative => write!(f, "set-associative"),
            MappingKind::FullyAssociative => write!(f, "fully-associative"),
        }
    }
}

impl FromStr for MappingKind {
    type Err = ConfigError;

    /// 接受名称（大小写不敏感，`-` 与 `_` 等价）或菜单编号 `1/2/3`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "1" | "direct" | "direct_mapped" | "dm" => Ok(MappingKind::DirectMapped),
            "2" | "set" | "set_associative" | "sa" => Ok(MappingKind::SetAssociative),
            "3" | "full" | "fully_associative" | "fa" => Ok(MappingKind::FullyAssociative),
            _ => Err(ConfigError::UnknownMapping(s.to_string())),
        }
    }
}

/// 地址拆分结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AddressParts {
    /// 标签
    pub tag: u32,
    /// 组索引
    pub set_index: usize,
    /// 块内偏移
    pub offset: u32,
    /// 块号（地址 / 块大小）
    pub block_number: u32,
}

/// 缓存几何结构（构造后不可变）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheGeometry {
    cache_size_bytes: u64,
    block_size_bytes: u64,
    main_memory_size_bytes: u64,
    mapping_kind: MappingKind,
    associativity: usize,
    num_sets: usize,
    offset_bits: u32,
    index_bits: u32,
    tag_bits: u32,
}

impl CacheGeometry {
    /// 由原始配置参数推导几何结构
    ///
    /// `associativity` 仅在组相联时使用，其余映射方式忽略该参数。
    ///
    /// # 错误
    ///
    /// - 任一尺寸不是 2 的幂：`ConfigError::NotPowerOfTwo`
    /// - 主存超过 [`MAX_MAIN_MEMORY_SIZE`]：`ConfigError::MemoryTooLarge`
    /// - 块大于缓存：`ConfigError::BlockLargerThanCache`
    /// - 组相联关联度缺失、为 0 或不能整除块数：`ConfigError::InvalidAssociativity`
    /// - 主存地址位宽小于 index + offset：`ConfigError::AddressSpaceTooSmall`
    /// - 缓存大于主存：`ConfigError::CacheLargerThanMemory`
    pub fn new(
        cache_size: u64,
        block_size: u64,
        mapping_kind: MappingKind,
        main_memory_size: u64,
        associativity: Option<u32>,
    ) -> Result<Self, ConfigError> {
        require_power_of_two("main_memory_size", main_memory_size)?;
        require_power_of_two("cache_size", cache_size)?;
        require_power_of_two("block_size", block_size)?;

        if main_memory_size > MAX_MAIN_MEMORY_SIZE {
            return Err(ConfigError::MemoryTooLarge {
                main_memory_size,
                max: MAX_MAIN_MEMORY_SIZE,
            });
        }

        if block_size > cache_size {
            return Err(ConfigError::BlockLargerThanCache {
                block_size,
                cache_size,
            });
        }

        let blocks = cache_size / block_size;
        let associativity = match mapping_kind {
            MappingKind::DirectMapped => 1,
            MappingKind::FullyAssociative => blocks,
            MappingKind::SetAssociative => {
                let ways = associativity.unwrap_or(0);
                if ways == 0 || blocks % u64::from(ways) != 0 {
                    return Err(ConfigError::InvalidAssociativity {
                        associativity: ways,
                        blocks,
                    });
                }
                u64::from(ways)
            }
        };
        // 块数是 2 的幂且关联度整除块数，因此组数同样是 2 的幂
        let num_sets = blocks / associativity;

        let offset_bits = block_size.trailing_zeros();
        let index_bits = num_sets.trailing_zeros();
        let address_bits = main_memory_size.trailing_zeros();
        let required_bits = offset_bits + index_bits;
        if address_bits < required_bits {
            return Err(ConfigError::AddressSpaceTooSmall {
                address_bits,
                required_bits,
            });
        }
        // 数据缓冲区按缓存大小分配，主存上限同时约束了分配量
        if cache_size > main_memory_size {
            return Err(ConfigError::CacheLargerThanMemory {
                cache_size,
                main_memory_size,
            });
        }

        let geometry = Self {
            cache_size_bytes: cache_size,
            block_size_bytes: block_size,
            main_memory_size_bytes: main_memory_size,
            mapping_kind,
            associativity: associativity as usize,
            num_sets: num_sets as usize,
            offset_bits,
            index_bits,
            tag_bits: address_bits - required_bits,
        };

        log::debug!(
            "Cache geometry: {} cache={}B block={}B sets={} ways={} bits(tag/index/offset)={}/{}/{}",
            geometry.mapping_kind,
            geometry.cache_size_bytes,
            geometry.block_size_bytes,
            geometry.num_sets,
            geometry.associativity,
            geometry.tag_bits,
            geometry.index_bits,
            geometry.offset_bits
        );

        Ok(geometry)
    }

    /// 拆分字节地址
    ///
    /// 纯算术运算，对任意 `u32` 地址均有定义（包括超出主存范围的地址）。
    #[inline]
    pub fn decompose(&self, address: u32) -> AddressParts {
        let address = u64::from(address);
        let block_number = address / self.block_size_bytes;
        let num_sets = self.num_sets as u64;

        // 商和余数都不超过原地址，转换回 u32 不会截断
        AddressParts {
            tag: (block_number / num_sets) as u32,
            set_index: (block_number % num_sets) as usize,
            offset: (address % self.block_size_bytes) as u32,
            block_number: block_number as u32,
        }
    }

    /// 指定组在块数组中占用的下标范围
    #[inline]
    pub fn set_range(&self, set_index: usize) -> Range<usize> {
        let start = set_index * self.associativity;
        start..start + self.associativity
    }

    pub fn cache_size_bytes(&self) -> u64 {
        self.cache_size_bytes
    }

    pub fn block_size_bytes(&self) -> u64 {
        self.block_size_bytes
    }

    pub fn main_memory_size_bytes(&self) -> u64 {
        self.main_memory_size_bytes
    }

    pub fn mapping_kind(&self) -> MappingKind {
        self.mapping_kind
    }

    /// 每组路数
    pub fn associativity(&self) -> usize {
        self.associativity
    }

    pub fn num_sets(&self) -> usize {
        self.num_sets
    }

    pub fn offset_bits(&self) -> u32 {
        self.offset_bits
    }

    pub fn index_bits(&self) -> u32 {
        self.index_bits
    }

    pub fn tag_bits(&self) -> u32 {
        self.tag_bits
    }

    /// 主存地址位宽，即 `log2(main_memory_size)`
    pub fn address_bits(&self) -> u32 {
        self.main_memory_size_bytes.trailing_zeros()
    }

    /// 块数组总长度（组数 × 关联度）
    pub fn total_blocks(&self) -> usize {
        self.num_sets * self.associativity
    }
}

fn require_power_of_two(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if value.is_power_of_two() {
        Ok(())
    } else {
        Err(ConfigError::NotPowerOfTwo { field, value })
    }
}
