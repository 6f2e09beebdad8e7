//! 缓存块

use serde::Serialize;

/// 缓存块（一组中的一路）
///
/// 仅由 [`CacheModel`](crate::CacheModel) 的块数组持有。`tag` 为 `None`
/// 即表示无效块。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheBlock {
    tag: Option<u32>,
    dirty: bool,
    /// 数据缓冲区（块大小个字，始终为零）
    payload: Box<[u32]>,
}

impl CacheBlock {
    pub(crate) fn new(words: usize) -> Self {
        Self {
            tag: None,
            dirty: false,
            payload: vec![0; words].into_boxed_slice(),
        }
    }

    /// 有效位
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.tag.is_some()
    }

    pub fn tag(&self) -> Option<u32> {
        self.tag
    }

    /// 脏位
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn payload(&self) -> &[u32] {
        &self.payload
    }

    /// 检查块是否有效且标签匹配
    #[inline]
    pub(crate) fn matches(&self, tag: u32) -> bool {
        self.tag == Some(tag)
    }

    /// 装入新标签：填充与替换都会置脏
    pub(crate) fn install(&mut self, tag: u32) {
        self.tag = Some(tag);
        self.dirty = true;
    }

    pub fn state(&self) -> BlockState {
        BlockState {
            valid: self.is_valid(),
            tag: self.tag,
            dirty: self.dirty,
        }
    }
}

/// 块状态快照（只读）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BlockState {
    pub valid: bool,
    pub tag: Option<u32>,
    pub dirty: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_block_is_invalid() {
        let block = CacheBlock::new(16);
        assert!(!block.is_valid());
        assert!(!block.is_dirty());
        assert_eq!(block.tag(), None);
        assert_eq!(block.payload().len(), 16);
        assert!(block.payload().iter().all(|&w| w == 0));
        assert_eq!(block.state(), BlockState::default());
    }

    #[test]
    fn test_install_marks_dirty() {
        let mut block = CacheBlock::new(4);
        block.install(7);
        assert!(block.matches(7));
        assert!(!block.matches(8));
        assert_eq!(
            block.state(),
            BlockState {
                valid: true,
                tag: Some(7),
                dirty: true
            }
        );
    }
}
