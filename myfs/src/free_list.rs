//! # 空闲块链表
//!
//! 空闲块经块尾指针串成单链表，表头记在超级块中。
//! 分配弹出表头，回收压入表头；每次变动后立即写回超级块。
//!
//! 回收时不检查该块是否真的在用，重复回收会同时破坏两条链。

use crate::block::BlockId;
use crate::{Error, MyFileSystem, Result};

impl MyFileSystem {
    /// 弹出空闲链表的表头，返回清零后的块号
    pub fn alloc_block(&mut self) -> Result<BlockId> {
        let id = self.super_block().first_free_block;
        if id.is_null() {
            log::debug!("free list exhausted");
            return Err(Error::NoSpace);
        }

        let mut block = self.read(id)?;
        let next = block.next();
        if !next.is_null() && (next <= BlockId::ROOT || !self.super_block().contains(next)) {
            return Err(Error::Corrupted(format!(
                "free block {id} links to block {next}"
            )));
        }
        self.super_block_mut().first_free_block = next;

        block.zeroize();
        self.write(&block)?;
        self.persist()?;

        log::trace!("alloc block {id}, free list head -> {next}");
        Ok(id)
    }

    /// 清零并压入空闲链表
    pub fn free_block(&mut self, id: BlockId) -> Result<()> {
        if id <= BlockId::ROOT {
            return Err(Error::Corrupted(format!("attempt to free reserved block {id}")));
        }

        let head = self.super_block().first_free_block;
        let mut block = self.new_block(id);
        block.set_next(head);
        self.write(&block)?;

        self.super_block_mut().first_free_block = id;
        self.persist()?;

        log::trace!("free block {id}, free list head {head} -> {id}");
        Ok(())
    }

    /// 空闲链表的长度
    pub fn free_count(&self) -> Result<usize> {
        let mut count = 0;
        for block in self.chain(self.super_block().first_free_block) {
            block?;
            count += 1;
        }
        Ok(count)
    }
}
