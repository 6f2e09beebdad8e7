//! 缓存模型
//!
//! 持有块数组（下标为 `set_index * associativity + way`）并实现查找、
//! 未命中填充与随机替换，同时维护命中 / 未命中 / 替换计数。
//!
//! 每次填充或替换都会把块置脏：模型不区分读写访问，因此不存在
//! “有效且干净”的状态。
//!
//! ```text
//! Invalid ──填充──▶ Valid,Dirty ──替换──▶ Valid,Dirty
//! ```

use serde::Serialize;

use crate::block::{BlockState, CacheBlock};
use crate::geometry::CacheGeometry;
use crate::replacement::{RandomReplacement, ReplacementPolicy};

/// 单次访问的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AccessResult {
    /// 组内某个有效路的标签匹配
    Hit { way: usize, tag: u32 },
    /// 未命中，填充了组内第一个空闲路
    MissFilled { way: usize, tag: u32 },
    /// 未命中且组已满，随机选中的路被替换
    MissEvicted {
        evicted_way: usize,
        evicted_tag: u32,
        /// 为真表示被替换的块需要写回
        evicted_was_dirty: bool,
        new_tag: u32,
    },
}

impl AccessResult {
    #[inline]
    pub fn is_hit(&self) -> bool {
        matches!(self, AccessResult::Hit { .. })
    }

    /// 访问结束后该路持有的标签
    pub fn tag(&self) -> u32 {
        match *self {
            AccessResult::Hit { tag, .. } | AccessResult::MissFilled { tag, .. } => tag,
            AccessResult::MissEvicted { new_tag, .. } => new_tag,
        }
    }

    /// 访问结束后被引用的路
    pub fn way(&self) -> usize {
        match *self {
            AccessResult::Hit { way, .. } | AccessResult::MissFilled { way, .. } => way,
            AccessResult::MissEvicted { evicted_way, .. } => evicted_way,
        }
    }
}

/// 累计统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CacheCounters {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl CacheCounters {
    /// 总访问次数
    pub fn accesses(&self) -> u64 {
        self.hits + self.misses
    }

    /// 命中率（无访问时为 0）
    pub fn hit_ratio(&self) -> f64 {
        ratio(self.hits, self.accesses())
    }

    /// 未命中率（无访问时为 0）
    pub fn miss_ratio(&self) -> f64 {
        ratio(self.misses, self.accesses())
    }
}

fn ratio(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

/// 缓存模型
#[derive(Debug)]
pub struct CacheModel<P: ReplacementPolicy = RandomReplacement> {
    geometry: CacheGeometry,
    blocks: Vec<CacheBlock>,
    counters: CacheCounters,
    policy: P,
}

impl CacheModel<RandomReplacement> {
    /// 创建模型，随机替换使用操作系统熵源
    pub fn new(geometry: CacheGeometry) -> Self {
        Self::with_policy(geometry, RandomReplacement::from_entropy())
    }

    /// 创建可复现的模型
    pub fn with_seed(geometry: CacheGeometry, seed: u64) -> Self {
        Self::with_policy(geometry, RandomReplacement::seeded(seed))
    }
}

impl<P: ReplacementPolicy> CacheModel<P> {
    /// 使用指定替换策略创建模型，所有块初始为无效
    pub fn with_policy(geometry: CacheGeometry, policy: P) -> Self {
        let words = geometry.block_size_bytes() as usize;
        let blocks = (0..geometry.total_blocks())
            .map(|_| CacheBlock::new(words))
            .collect();

        log::debug!(
            "Creating cache model with {} blocks ({} sets x {} ways), policy: {:?}",
            geometry.total_blocks(),
            geometry.num_sets(),
            geometry.associativity(),
            policy
        );

        Self {
            geometry,
            blocks,
            counters: CacheCounters::default(),
            policy,
        }
    }

    /// 访问一个地址
    ///
    /// 只扫描地址所在组的各路。该操作对任何地址都有定义，不会失败。
    pub fn access(&mut self, address: u32) -> AccessResult {
        let parts = self.geometry.decompose(address);
        let range = self.geometry.set_range(parts.set_index);
        let base = range.start;
        let set = &mut self.blocks[range];

        // 命中：只更新计数
        if let Some(way) = set.iter().position(|b| b.matches(parts.tag)) {
            self.counters.hits += 1;
            log::trace!(
                "{:#010x}: hit set={} way={} tag={:#x}",
                address,
                parts.set_index,
                way,
                parts.tag
            );
            return AccessResult::Hit {
                way,
                tag: parts.tag,
            };
        }

        self.counters.misses += 1;

        // 优先填充第一个空闲路
        if let Some(way) = set.iter().position(|b| !b.is_valid()) {
            set[way].install(parts.tag);
            log::trace!(
                "{:#010x}: miss, filled set={} way={} (slot {}) tag={:#x}",
                address,
                parts.set_index,
                way,
                base + way,
                parts.tag
            );
            return AccessResult::MissFilled {
                way,
                tag: parts.tag,
            };
        }

        // 组已满：随机替换
        self.counters.evictions += 1;
        let ways = set.len();
        // 越界的路号按路数取模
        let way = self.policy.select_victim(parts.set_index, ways) % ways;

        let victim = &mut set[way];
        // 组已满时每一路都有效
        let evicted_tag = victim.tag().unwrap_or_default();
        let evicted_was_dirty = victim.is_dirty();
        victim.install(parts.tag);

        if evicted_was_dirty {
            log::debug!(
                "Writing back dirty block: slot {} tag={:#x}",
                base + way,
                evicted_tag
            );
        }
        log::debug!(
            "{:#010x}: evicted set={} way={} tag={:#x} -> {:#x}",
            address,
            parts.set_index,
            way,
            evicted_tag,
            parts.tag
        );

        AccessResult::MissEvicted {
            evicted_way: way,
            evicted_tag,
            evicted_was_dirty,
            new_tag: parts.tag,
        }
    }

    /// 按块数组顺序返回所有块的状态
    pub fn snapshot(&self) -> Vec<BlockState> {
        self.blocks.iter().map(CacheBlock::state).collect()
    }

    pub fn counters(&self) -> CacheCounters {
        self.counters
    }

    pub fn geometry(&self) -> &CacheGeometry {
        &self.geometry
    }

    /// 按块数组下标获取块
    pub fn block(&self, index: usize) -> Option<&CacheBlock> {
        self.blocks.get(index)
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }
}
