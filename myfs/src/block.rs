//! # 块层
//!
//! 没有缓存：[`Block`]只是一次读写所用的块缓冲，
//! 读入后修改，再整块写回。

use binrw::binrw;
use derive_more::{Display, From, Into};

use crate::PTR_SIZE;

/// 块编号
#[binrw]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into, Display)]
#[repr(transparent)]
pub struct BlockId(u32);

impl From<BlockId> for usize {
    fn from(id: BlockId) -> Self {
        id.0 as usize
    }
}

impl BlockId {
    /// 链尾，或"没有块"
    pub const NULL: Self = Self(0);

    pub const SUPER: Self = Self(0);

    pub const ROOT: Self = Self(1);

    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// 内存中的块
#[derive(Debug, Clone)]
pub struct Block {
    id: BlockId,
    data: Box<[u8]>,
}

impl Block {
    pub fn zeroed(id: BlockId, block_size: usize) -> Self {
        debug_assert!(block_size > PTR_SIZE);
        Self {
            id,
            data: vec![0; block_size].into(),
        }
    }

    pub(crate) fn from_raw(id: BlockId, data: Box<[u8]>) -> Self {
        Self { id, data }
    }

    #[inline]
    pub fn id(&self) -> BlockId {
        self.id
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// 块尾指针之前的部分
    #[inline]
    pub fn body(&self) -> &[u8] {
        &self.data[..self.tail()]
    }

    #[inline]
    pub fn body_mut(&mut self) -> &mut [u8] {
        let tail = self.tail();
        &mut self.data[..tail]
    }

    /// 读取块尾的"下一块"指针
    pub fn next(&self) -> BlockId {
        let mut raw = [0; PTR_SIZE];
        raw.copy_from_slice(&self.data[self.tail()..]);
        BlockId(u32::from_le_bytes(raw))
    }

    pub fn set_next(&mut self, next: BlockId) {
        let tail = self.tail();
        self.data[tail..].copy_from_slice(&next.0.to_le_bytes());
    }

    #[inline]
    pub fn zeroize(&mut self) {
        self.data.fill(0);
    }

    #[inline]
    fn tail(&self) -> usize {
        self.data.len() - PTR_SIZE
    }
}
