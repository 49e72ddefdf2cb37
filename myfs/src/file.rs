//! # 文件数据引擎
//!
//! 文件内容存放在一条块链上，每块装`block_size - 4`字节，末块尾部多余的字节不保证为0。
//! 文件写入后不可追加或截断。

use crate::block::{Block, BlockId};
use crate::{Error, MyFileSystem, Result};

impl MyFileSystem {
    /// 将`data`切块写入新分配的块链，返回链头与总字节数。
    ///
    /// 空文件同样占用一块，因此文件的链头永远不是[`BlockId::NULL`]。
    pub fn write_file(&mut self, data: &[u8]) -> Result<(BlockId, u32)> {
        let size = u32::try_from(data.len()).map_err(|_| Error::FileTooLarge(data.len()))?;
        let payload = self.super_block().payload_size();

        let mut chunks: Vec<&[u8]> = data.chunks(payload).collect();
        if chunks.is_empty() {
            chunks.push(&[]);
        }

        let mut head = BlockId::NULL;
        let mut prev: Option<Block> = None;
        for chunk in chunks {
            let id = self.alloc_block()?;
            let mut block = self.new_block(id);
            block.body_mut()[..chunk.len()].copy_from_slice(chunk);

            // 先链好前一块再写回
            match prev.take() {
                Some(mut prev) => {
                    prev.set_next(id);
                    self.write(&prev)?;
                }
                None => head = id,
            }
            prev = Some(block);
        }
        if let Some(last) = prev {
            self.write(&last)?;
        }

        log::debug!("wrote {size} bytes starting at block {head}");
        Ok((head, size))
    }

    /// 沿链读出`size`字节，链提前结束视为损坏
    pub fn read_file(&self, start: BlockId, size: u32) -> Result<Vec<u8>> {
        let size = size as usize;
        let mut data = Vec::with_capacity(size);
        if size == 0 {
            return Ok(data);
        }

        for block in self.chain(start) {
            let block = block?;
            let take = (size - data.len()).min(block.body().len());
            data.extend_from_slice(&block.body()[..take]);
            if data.len() == size {
                return Ok(data);
            }
        }

        log::warn!(
            "chain from block {start} ended after {} of {size} bytes",
            data.len()
        );
        Err(Error::Corrupted(format!(
            "file chain from block {start} ends after {} of {size} bytes",
            data.len()
        )))
    }

    /// 按链的顺序逐块回收，回收前先取出下一块的块号
    pub fn delete_chain(&mut self, start: BlockId) -> Result<usize> {
        let total = self.super_block().total_blocks as usize;
        let mut current = start;
        let mut freed = 0;
        while !current.is_null() {
            if freed == total {
                return Err(Error::Corrupted(format!(
                    "chain from block {start} never ends"
                )));
            }
            let next = self.read(current)?.next();
            self.free_block(current)?;
            freed += 1;
            current = next;
        }

        log::debug!("freed {freed} blocks starting at block {start}");
        Ok(freed)
    }

    /// 链上第`n`块（从0数起）的原始内容
    pub fn read_nth_block(&self, start: BlockId, n: usize) -> Result<Block> {
        for (i, block) in self.chain(start).enumerate() {
            let block = block?;
            if i == n {
                return Ok(block);
            }
        }
        Err(Error::NoSuchBlock(n))
    }

    /// 链的块数
    pub fn chain_len(&self, start: BlockId) -> Result<usize> {
        let mut len = 0;
        for block in self.chain(start) {
            block?;
            len += 1;
        }
        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use block_dev::RamDisk;

    use super::*;

    fn fs(total_blocks: u32) -> MyFileSystem {
        let dev = Arc::new(RamDisk::new(64 * total_blocks as usize));
        MyFileSystem::format(dev, 64, total_blocks).unwrap()
    }

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 7 + 3) as u8).collect()
    }

    #[test]
    fn chunking() {
        let mut fs = fs(10);
        let data = pattern(100);
        let (start, size) = fs.write_file(&data).unwrap();

        assert_eq!((BlockId::new(2), 100), (start, size));
        assert_eq!(2, fs.chain_len(start).unwrap());
        assert_eq!(BlockId::new(3), fs.read(start).unwrap().next());
        assert_eq!(data, fs.read_file(start, size).unwrap());

        let second = fs.read_nth_block(start, 1).unwrap();
        assert_eq!(data[60..], second.body()[..40]);
        assert!(second.next().is_null());
        assert!(matches!(fs.read_nth_block(start, 2), Err(Error::NoSuchBlock(2))));
    }

    #[test]
    fn exact_multiple() {
        let mut fs = fs(10);
        let data = pattern(120);
        let (start, size) = fs.write_file(&data).unwrap();
        assert_eq!(2, fs.chain_len(start).unwrap());
        assert_eq!(data, fs.read_file(start, size).unwrap());
    }

    #[test]
    fn empty_file_takes_one_block() {
        let mut fs = fs(4);
        let (start, size) = fs.write_file(&[]).unwrap();
        assert!(!start.is_null());
        assert_eq!(0, size);
        assert_eq!(1, fs.chain_len(start).unwrap());
        assert!(fs.read_file(start, size).unwrap().is_empty());
    }

    #[test]
    fn truncated_chain() {
        let mut fs = fs(10);
        let (start, _) = fs.write_file(&pattern(50)).unwrap();
        assert!(matches!(fs.read_file(start, 200), Err(Error::Corrupted(_))));
    }

    #[test]
    fn delete_returns_blocks() {
        let mut fs = fs(10);
        let free = fs.free_count().unwrap();
        let (start, _) = fs.write_file(&pattern(170)).unwrap();
        assert_eq!(free - 3, fs.free_count().unwrap());

        assert_eq!(3, fs.delete_chain(start).unwrap());
        assert_eq!(free, fs.free_count().unwrap());
        // 最后回收的块成为表头
        assert_eq!(BlockId::new(4), fs.super_block().first_free_block);
    }

    #[test]
    fn out_of_space() {
        let mut fs = fs(4);
        assert!(matches!(fs.write_file(&pattern(121)), Err(Error::NoSpace)));
    }
}
