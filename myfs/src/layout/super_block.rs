use std::io::Cursor;

use binrw::{BinRead, BinWrite, binrw};

use crate::{BlockId, ENTRY_SIZE, Error, MIN_BLOCK_SIZE, PTR_SIZE, Result};

/// 超级块，位于0号块开头：
/// - 记录块大小与总块数；
/// - 持有空闲链表的表头；
/// - 定位根目录（恒为1号块）
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuperBlock {
    /// 每块字节数
    pub block_size: u32,
    /// 格式化时确定，之后不变
    pub total_blocks: u32,
    /// 空闲链表表头，[`BlockId::NULL`]表示没有空闲块
    pub first_free_block: BlockId,
    pub root_dir_block: BlockId,
}

impl SuperBlock {
    /// 新格式化的文件系统：0号超级块，1号根目录，其余全部空闲。
    pub fn new(block_size: u32, total_blocks: u32) -> Self {
        Self {
            block_size,
            total_blocks,
            first_free_block: if total_blocks > 2 {
                BlockId::new(2)
            } else {
                BlockId::NULL
            },
            root_dir_block: BlockId::ROOT,
        }
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(Self::read(&mut Cursor::new(bytes))?)
    }

    pub fn encode(&self, bytes: &mut [u8]) -> Result<()> {
        Ok(self.write(&mut Cursor::new(bytes))?)
    }

    /// 打开已有文件系统时的合法性校验
    pub fn validate(&self) -> Result<()> {
        if (self.block_size as usize) < MIN_BLOCK_SIZE {
            return Err(Error::Corrupted(format!(
                "block size {} is below {MIN_BLOCK_SIZE}",
                self.block_size
            )));
        }
        if self.total_blocks < 2 {
            return Err(Error::Corrupted(format!(
                "only {} blocks in total",
                self.total_blocks
            )));
        }
        if self.root_dir_block != BlockId::ROOT {
            return Err(Error::Corrupted(format!(
                "root directory at block {}",
                self.root_dir_block
            )));
        }
        if !self.first_free_block.is_null()
            && (self.first_free_block <= BlockId::ROOT
                || u32::from(self.first_free_block) >= self.total_blocks)
        {
            return Err(Error::Corrupted(format!(
                "free list starts at block {}",
                self.first_free_block
            )));
        }

        Ok(())
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size as usize
    }

    /// 数据块中可容纳的文件字节数
    #[inline]
    pub fn payload_size(&self) -> usize {
        self.block_size() - PTR_SIZE
    }

    /// 目录块中的目录项槽位数
    #[inline]
    pub fn entries_per_block(&self) -> usize {
        self.payload_size() / ENTRY_SIZE
    }

    #[inline]
    pub fn contains(&self, id: BlockId) -> bool {
        u32::from(id) < self.total_blocks
    }
}
