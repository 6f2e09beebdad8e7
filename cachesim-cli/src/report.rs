//! 模拟报告
//!
//! 驱动缓存模型完成整条轨迹，并把结果渲染为文本或 JSON。

use std::fmt;

use cachesim_core::{
    AccessResult, AddressParts, BlockState, CacheCounters, CacheGeometry, CacheModel,
    ReplacementPolicy,
};
use serde::Serialize;

/// 单次访问记录
#[derive(Debug, Clone, Serialize)]
pub struct AccessRecord {
    pub address: u32,
    #[serde(flatten)]
    pub parts: AddressParts,
    /// 访问结束后被引用的块数组下标
    pub slot: usize,
    pub result: AccessResult,
}

/// 完整的模拟报告
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub geometry: CacheGeometry,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub accesses: Vec<AccessRecord>,
    pub counters: CacheCounters,
    pub hit_ratio: f64,
    pub miss_ratio: f64,
    pub blocks: Vec<BlockState>,
}

impl SimulationReport {
    /// 依次访问所有地址并收集结果
    pub fn run<P: ReplacementPolicy>(
        model: &mut CacheModel<P>,
        addresses: &[u32],
        seed: Option<u64>,
    ) -> Self {
        let geometry = *model.geometry();
        let accesses = addresses
            .iter()
            .map(|&address| {
                let parts = geometry.decompose(address);
                let result = model.access(address);
                AccessRecord {
                    address,
                    parts,
                    slot: geometry.set_range(parts.set_index).start + result.way(),
                    result,
                }
            })
            .collect();

        let counters = model.counters();
        log::info!(
            "Simulated {} accesses: {} hits, {} misses, {} evictions",
            counters.accesses(),
            counters.hits,
            counters.misses,
            counters.evictions
        );

        Self {
            geometry,
            seed,
            accesses,
            counters,
            hit_ratio: counters.hit_ratio(),
            miss_ratio: counters.miss_ratio(),
            blocks: model.snapshot(),
        }
    }

    /// 文本视图；`quiet` 时省略逐条访问记录
    pub fn text(&self, quiet: bool) -> TextReport<'_> {
        TextReport {
            report: self,
            quiet,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// 文本格式报告
pub struct TextReport<'a> {
    report: &'a SimulationReport,
    quiet: bool,
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        let g = &report.geometry;

        writeln!(f, "Cache Configuration:")?;
        writeln!(f, "Mapping: {}", g.mapping_kind())?;
        writeln!(f, "Main Memory Size: {}", g.main_memory_size_bytes())?;
        writeln!(f, "Cache Size: {}", g.cache_size_bytes())?;
        writeln!(f, "Block Size: {}", g.block_size_bytes())?;
        writeln!(f, "Number of Sets: {}", g.num_sets())?;
        writeln!(f, "Associativity: {}", g.associativity())?;
        writeln!(f, "Offset Bits: {}", g.offset_bits())?;
        writeln!(f, "Index Bits: {}", g.index_bits())?;
        writeln!(f, "Tag Bits: {}", g.tag_bits())?;
        if let Some(seed) = report.seed {
            writeln!(f, "Replacement Seed: {}", seed)?;
        }

        if !self.quiet && !report.accesses.is_empty() {
            writeln!(f)?;
            for record in &report.accesses {
                write_access(f, g, record)?;
            }
        }

        let c = &report.counters;
        writeln!(f)?;
        writeln!(f, "Hits: {}", c.hits)?;
        writeln!(f, "Misses: {}", c.misses)?;
        writeln!(f, "Evictions: {}", c.evictions)?;
        writeln!(f, "Hit Ratio: {:.2}", report.hit_ratio)?;
        writeln!(f, "Miss Ratio: {:.2}", report.miss_ratio)?;

        writeln!(f)?;
        writeln!(f, "Cache Contents:")?;
        for (index, block) in report.blocks.iter().enumerate() {
            let tag = block
                .tag
                .map_or_else(|| "-".to_string(), |t| t.to_string());
            writeln!(
                f,
                "Index: {}, Valid: {}, Tag: {}, Dirty: {}",
                index,
                u8::from(block.valid),
                tag,
                u8::from(block.dirty)
            )?;
        }
        Ok(())
    }
}

fn write_access(
    f: &mut fmt::Formatter<'_>,
    g: &CacheGeometry,
    record: &AccessRecord,
) -> fmt::Result {
    let outcome = if record.result.is_hit() {
        "Cache Hit"
    } else {
        "Cache Miss"
    };
    writeln!(
        f,
        "Address: {:032b} (Tag: {}, Set: {}, Offset: {}), {}",
        record.address, record.parts.tag, record.parts.set_index, record.parts.offset, outcome
    )?;

    match record.result {
        AccessResult::Hit { .. } => {}
        AccessResult::MissFilled { tag, .. } => {
            writeln!(f, "Updated Cache Block at Index: {}, Tag: {}, Valid: 1", record.slot, tag)?;
        }
        AccessResult::MissEvicted {
            evicted_tag,
            evicted_was_dirty,
            new_tag,
            ..
        } => {
            if evicted_was_dirty {
                writeln!(
                    f,
                    "Writing back dirty cache block at Index: {}, Tag: {}",
                    record.slot, evicted_tag
                )?;
            }
            writeln!(
                f,
                "Evicting cache block at Index: {}, Tag: {}, Dirty: {}",
                record.slot,
                evicted_tag,
                u8::from(evicted_was_dirty)
            )?;
            writeln!(
                f,
                "Updated Cache Block at Index: {}, Tag: {}, Valid: 1",
                record.slot, new_tag
            )?;
        }
    }

    // 多路时附加组号与路号
    if g.associativity() > 1 {
        writeln!(
            f,
            "  (set {}, way {})",
            record.parts.set_index,
            record.result.way()
        )?;
    }
    Ok(())
}
