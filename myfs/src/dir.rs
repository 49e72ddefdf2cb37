//! # 目录引擎
//!
//! 目录是一条块链，每块依次存放`(block_size - 4) / 21`个目录项槽位，
//! 块尾4字节指向下一个目录块。槽位不排序，分配后位置固定，直到被标记为墓碑。

use crate::block::{Block, BlockId};
use crate::layout::{Entry, Name, is_free_slot};
use crate::{ENTRY_SIZE, Error, MyFileSystem, Result};

/// 目录项在磁盘上的位置：所在块 + 块内槽位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryPos {
    pub block: BlockId,
    pub slot: usize,
}

impl EntryPos {
    pub const fn new(block: BlockId, slot: usize) -> Self {
        Self { block, slot }
    }
}

/// 以链头块号表示的目录
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dir {
    head: BlockId,
}

impl Dir {
    pub const fn new(head: BlockId) -> Self {
        Self { head }
    }

    #[inline]
    pub fn head(&self) -> BlockId {
        self.head
    }

    /// 按名称精确查找活动目录项，返回首个匹配。
    pub fn find(&self, name: &Name, fs: &MyFileSystem) -> Result<Option<(Entry, EntryPos)>> {
        for block in fs.chain(self.head) {
            let block = block?;
            for (slot, bytes) in slots(&block) {
                match Entry::decode(bytes)? {
                    Some(entry) if entry.name == *name => {
                        return Ok(Some((entry, EntryPos::new(block.id(), slot))));
                    }
                    _ => {}
                }
            }
        }

        Ok(None)
    }

    /// 写入第一个空闲槽位；整条链都满时分配新块接到链尾。
    ///
    /// 不检查重名，由调用者先行[`Dir::find`]。
    pub fn insert(&self, entry: &Entry, fs: &mut MyFileSystem) -> Result<EntryPos> {
        let mut tail = None;
        for block in fs.chain(self.head) {
            let mut block = block?;
            let free = slots(&block)
                .find_map(|(slot, bytes)| is_free_slot(bytes).then_some(slot));
            if let Some(slot) = free {
                entry.encode(slot_mut(&mut block, slot)?)?;
                fs.write(&block)?;

                log::debug!(
                    "dir {}: insert {:?} at ({}, {slot})",
                    self.head,
                    entry.name,
                    block.id()
                );
                return Ok(EntryPos::new(block.id(), slot));
            }
            tail = Some(block);
        }
        let mut tail = tail.ok_or_else(|| {
            Error::Corrupted(format!("directory {} has no blocks", self.head))
        })?;

        // 链已满，扩展一块
        let id = fs.alloc_block()?;
        let mut block = fs.new_block(id);
        entry.encode(slot_mut(&mut block, 0)?)?;
        fs.write(&block)?;

        tail.set_next(id);
        fs.write(&tail)?;

        log::debug!(
            "dir {}: extended with block {id} after {}, insert {:?}",
            self.head,
            tail.id(),
            entry.name
        );
        Ok(EntryPos::new(id, 0))
    }

    /// 将槽位标记为墓碑。
    ///
    /// 即使块因此变空也不回收，该项自身的块链同样由调用者处理。
    pub fn remove(&self, pos: EntryPos, fs: &MyFileSystem) -> Result<()> {
        let mut block = fs.read(pos.block)?;
        let slot = slot_mut(&mut block, pos.slot)?;
        if is_free_slot(slot) {
            log::warn!(
                "dir {}: slot ({}, {}) is already free",
                self.head,
                pos.block,
                pos.slot
            );
        }
        slot[0] = 0;
        fs.write(&block)?;

        log::debug!("dir {}: tombstone ({}, {})", self.head, pos.block, pos.slot);
        Ok(())
    }

    /// 链上所有槽位都空闲时为真
    pub fn is_empty(&self, fs: &MyFileSystem) -> Result<bool> {
        for block in fs.chain(self.head) {
            if !slots(&block?).all(|(_, bytes)| is_free_slot(bytes)) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// 按槽位顺序列出活动目录项
    pub fn entries(&self, fs: &MyFileSystem) -> Result<Vec<(Entry, EntryPos)>> {
        let mut entries = Vec::new();
        for block in fs.chain(self.head) {
            let block = block?;
            for (slot, bytes) in slots(&block) {
                if let Some(entry) = Entry::decode(bytes)? {
                    entries.push((entry, EntryPos::new(block.id(), slot)));
                }
            }
        }
        Ok(entries)
    }
}

/// 块内的全部槽位
fn slots(block: &Block) -> impl Iterator<Item = (usize, &[u8])> {
    block.body().chunks_exact(ENTRY_SIZE).enumerate()
}

fn slot_mut(block: &mut Block, slot: usize) -> Result<&mut [u8]> {
    let id = block.id();
    let start = slot * ENTRY_SIZE;
    block
        .body_mut()
        .get_mut(start..start + ENTRY_SIZE)
        .ok_or_else(|| Error::Corrupted(format!("block {id} has no slot {slot}")))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use block_dev::RamDisk;

    use super::*;
    use crate::layout::EntryKind;

    fn fs() -> MyFileSystem {
        MyFileSystem::format(Arc::new(RamDisk::new(64 * 10)), 64, 10).unwrap()
    }

    fn file(name: &str, start: u32) -> Entry {
        Entry::new_file(Name::new(name).unwrap(), BlockId::new(start), 1)
    }

    #[test]
    fn insert_then_find() {
        let mut fs = fs();
        let root = fs.root();
        assert!(root.is_empty(&fs).unwrap());

        let pos = root.insert(&file("x", 7), &mut fs).unwrap();
        assert_eq!(EntryPos::new(BlockId::ROOT, 0), pos);

        let (entry, found) = root.find(&Name::new("x").unwrap(), &fs).unwrap().unwrap();
        assert_eq!((EntryKind::File, BlockId::new(7)), (entry.kind, entry.start_block));
        assert_eq!(pos, found);
        assert!(root.find(&Name::new("X").unwrap(), &fs).unwrap().is_none());
        assert!(!root.is_empty(&fs).unwrap());
    }

    #[test]
    fn extends_full_chain() {
        let mut fs = fs();
        let root = fs.root();
        root.insert(&file("a", 2), &mut fs).unwrap();
        root.insert(&file("b", 2), &mut fs).unwrap();
        let free = fs.free_count().unwrap();

        let pos = root.insert(&file("c", 2), &mut fs).unwrap();
        assert_eq!(EntryPos::new(BlockId::new(2), 0), pos);
        assert_eq!(free - 1, fs.free_count().unwrap());
        assert_eq!(BlockId::new(2), fs.read(BlockId::ROOT).unwrap().next());

        let (_, found) = root.find(&Name::new("c").unwrap(), &fs).unwrap().unwrap();
        assert_eq!(pos, found);

        let names: Vec<String> = root
            .entries(&fs)
            .unwrap()
            .iter()
            .map(|(e, _)| e.name.to_string())
            .collect();
        assert_eq!(["a", "b", "c"], names.as_slice());
    }

    #[test]
    fn tombstone_reuse() {
        let mut fs = fs();
        let root = fs.root();
        for name in ["a", "b", "c"] {
            root.insert(&file(name, 2), &mut fs).unwrap();
        }

        let (_, pos) = root.find(&Name::new("c").unwrap(), &fs).unwrap().unwrap();
        root.remove(pos, &fs).unwrap();
        assert!(root.find(&Name::new("c").unwrap(), &fs).unwrap().is_none());
        // 空了的扩展块仍挂在链上
        assert_eq!(BlockId::new(2), fs.read(BlockId::ROOT).unwrap().next());

        let (_, pos) = root.find(&Name::new("a").unwrap(), &fs).unwrap().unwrap();
        root.remove(pos, &fs).unwrap();
        let again = root.insert(&file("d", 2), &mut fs).unwrap();
        assert_eq!(pos, again);
    }

    #[test]
    fn emptiness_spans_chain() {
        let mut fs = fs();
        let root = fs.root();
        for name in ["a", "b", "c"] {
            root.insert(&file(name, 2), &mut fs).unwrap();
        }
        for name in ["a", "b"] {
            let (_, pos) = root.find(&Name::new(name).unwrap(), &fs).unwrap().unwrap();
            root.remove(pos, &fs).unwrap();
        }
        assert!(!root.is_empty(&fs).unwrap());

        let (_, pos) = root.find(&Name::new("c").unwrap(), &fs).unwrap().unwrap();
        root.remove(pos, &fs).unwrap();
        assert!(root.is_empty(&fs).unwrap());
    }

    #[test]
    fn bad_slot() {
        let fs = fs();
        let root = fs.root();
        assert!(matches!(
            root.remove(EntryPos::new(BlockId::ROOT, 2), &fs),
            Err(Error::Corrupted(_))
        ));
    }
}
