//! # 超级块管理器
//!
//! 格式化与打开文件系统，并负责所有经过边界检查的块读写。
//! 超级块在每次分配、回收后立即写回，命令之间不保留任何内存状态。

use std::sync::Arc;

use block_dev::BlockDevice;

use crate::block::{Block, BlockId};
use crate::dir::Dir;
use crate::layout::SuperBlock;
use crate::{Error, MIN_BLOCK_SIZE, Result, SUPER_BLOCK_SIZE};

#[derive(Debug)]
pub struct MyFileSystem {
    dev: Arc<dyn BlockDevice>,
    sb: SuperBlock,
}

impl MyFileSystem {
    /// 在设备上建立新的文件系统。
    ///
    /// 设备长度应恰为`block_size * total_blocks`字节，由调用者预先设定。
    pub fn format(dev: Arc<dyn BlockDevice>, block_size: u32, total_blocks: u32) -> Result<Self> {
        Self::check_geometry(block_size, total_blocks)?;

        let fs = Self {
            dev,
            sb: SuperBlock::new(block_size, total_blocks),
        };
        fs.persist()?;

        // 空的根目录
        fs.write(&fs.new_block(BlockId::ROOT))?;

        // 把 2..total_blocks 串成空闲链表
        for i in 2..total_blocks {
            let mut block = fs.new_block(BlockId::new(i));
            if i + 1 < total_blocks {
                block.set_next(BlockId::new(i + 1));
            }
            fs.write(&block)?;
        }

        log::info!("formatted: block_size={block_size} total_blocks={total_blocks}");
        Ok(fs)
    }

    /// 检查几何参数能否容纳超级块、根目录与至少一个目录项，不触碰任何设备。
    pub fn check_geometry(block_size: u32, total_blocks: u32) -> Result<()> {
        if total_blocks < 2 {
            return Err(Error::InvalidGeometry(format!(
                "need at least 2 blocks, got {total_blocks}"
            )));
        }
        if (block_size as usize) < MIN_BLOCK_SIZE {
            return Err(Error::InvalidGeometry(format!(
                "block size {block_size} is below {MIN_BLOCK_SIZE}"
            )));
        }
        u64::from(block_size)
            .checked_mul(u64::from(total_blocks))
            .filter(|&len| usize::try_from(len).is_ok())
            .ok_or_else(|| {
                Error::InvalidGeometry(format!(
                    "{total_blocks} blocks of {block_size} bytes overflow"
                ))
            })?;

        Ok(())
    }

    pub fn open(dev: Arc<dyn BlockDevice>) -> Result<Self> {
        let mut buf = [0; SUPER_BLOCK_SIZE];
        dev.read_block(0, &mut buf)?;
        let sb = SuperBlock::decode(&buf)?;
        if let Err(e) = sb.validate() {
            log::warn!("refusing to open: {sb:?}");
            return Err(e);
        }
        log::debug!("opened: {sb:?}");

        Ok(Self { dev, sb })
    }

    #[inline]
    pub fn super_block(&self) -> &SuperBlock {
        &self.sb
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.sb.block_size()
    }

    #[inline]
    pub fn root(&self) -> Dir {
        Dir::new(self.sb.root_dir_block)
    }

    /// 读出一块，块号必须在范围内
    pub fn read(&self, id: BlockId) -> Result<Block> {
        self.check(id)?;
        let mut data = vec![0; self.block_size()].into_boxed_slice();
        self.dev.read_block(id.into(), &mut data)?;
        Ok(Block::from_raw(id, data))
    }

    pub fn write(&self, block: &Block) -> Result<()> {
        self.check(block.id())?;
        if block.as_slice().len() != self.block_size() {
            return Err(Error::Corrupted(format!(
                "block {} buffer holds {} bytes",
                block.id(),
                block.as_slice().len()
            )));
        }
        self.dev.write_block(block.id().into(), block.as_slice())?;
        Ok(())
    }

    #[inline]
    pub fn new_block(&self, id: BlockId) -> Block {
        Block::zeroed(id, self.block_size())
    }

    /// 从`head`出发沿块尾指针遍历一条链
    pub fn chain(&self, head: BlockId) -> Chain<'_> {
        Chain {
            fs: self,
            next: head,
            steps: 0,
        }
    }

    /// 写回超级块
    pub(crate) fn persist(&self) -> Result<()> {
        let mut block = self.new_block(BlockId::SUPER);
        self.sb.encode(block.as_mut_slice())?;
        self.dev.write_block(0, block.as_slice())?;
        Ok(())
    }

    pub(crate) fn super_block_mut(&mut self) -> &mut SuperBlock {
        &mut self.sb
    }

    fn check(&self, id: BlockId) -> Result<()> {
        if self.sb.contains(id) {
            Ok(())
        } else {
            Err(Error::OutOfRange(id))
        }
    }
}

/// 块链迭代器。
///
/// 最多走`total_blocks`步，超出即说明链成环。
pub struct Chain<'a> {
    fs: &'a MyFileSystem,
    next: BlockId,
    steps: u32,
}

impl Iterator for Chain<'_> {
    type Item = Result<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next.is_null() {
            return None;
        }
        if self.steps == self.fs.sb.total_blocks {
            log::warn!("chain through block {} never ends", self.next);
            self.next = BlockId::NULL;
            return Some(Err(Error::Corrupted("block chain forms a cycle".into())));
        }
        self.steps += 1;

        match self.fs.read(self.next) {
            Ok(block) => {
                self.next = block.next();
                Some(Ok(block))
            }
            Err(e) => {
                self.next = BlockId::NULL;
                Some(Err(e))
            }
        }
    }
}
