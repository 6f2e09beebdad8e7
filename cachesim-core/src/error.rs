//! 配置错误类型
//!
//! 缓存构造阶段唯一的错误类别。访问操作本身是全函数，不会失败。

use thiserror::Error;

/// 配置错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// 尺寸不是 2 的幂（包括 0）
    #[error("{field} must be a non-zero power of two, got {value}")]
    NotPowerOfTwo { field: &'static str, value: u64 },

    /// 块大小超过缓存大小
    #[error("block size {block_size} is larger than cache size {cache_size}")]
    BlockLargerThanCache { block_size: u64, cache_size: u64 },

    /// 主存超出 32 位地址可寻址的范围
    #[error("main memory size {main_memory_size} exceeds the {max}-byte 32-bit address space")]
    MemoryTooLarge { main_memory_size: u64, max: u64 },

    /// 缓存大于主存
    #[error("cache size {cache_size} is larger than main memory size {main_memory_size}")]
    CacheLargerThanMemory { cache_size: u64, main_memory_size: u64 },

    /// 关联度为 0 或不能整除缓存块数
    #[error("associativity {associativity} must be non-zero and divide the {blocks} cache blocks")]
    InvalidAssociativity { associativity: u32, blocks: u64 },

    /// 主存地址位数不足以容纳 index 与 offset 字段
    #[error(
        "a {address_bits}-bit main memory address cannot hold {required_bits} index and offset bits"
    )]
    AddressSpaceTooSmall { address_bits: u32, required_bits: u32 },

    /// 无法识别的映射方式
    #[error("unknown mapping kind: {0}")]
    UnknownMapping(String),

    /// 解析错误
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}
