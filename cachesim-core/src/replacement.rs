//! 替换策略
//!
//! 组内没有空闲路时由替换策略挑选受害者。目前只提供随机替换，
//! 随机源由策略自身持有，可通过种子复现。

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 替换策略
pub trait ReplacementPolicy: fmt::Debug {
    /// 在 `set_index` 组的 `ways` 路中选择受害者
    ///
    /// 返回值应小于 `ways`；越界时模型按 `ways` 取模。
    fn select_victim(&mut self, set_index: usize, ways: usize) -> usize;
}

/// 随机替换：在组内各路中均匀随机选择
pub struct RandomReplacement {
    rng: StdRng,
    seed: Option<u64>,
}

impl RandomReplacement {
    /// 使用操作系统熵源初始化
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            seed: None,
        }
    }

    /// 使用固定种子初始化（相同种子与访问序列得到相同结果）
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

impl fmt::Debug for RandomReplacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomReplacement")
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

impl ReplacementPolicy for RandomReplacement {
    fn select_victim(&mut self, _set_index: usize, ways: usize) -> usize {
        self.rng.gen_range(0..ways)
    }
}
