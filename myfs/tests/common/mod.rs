use std::sync::Arc;

use block_dev::RamDisk;
use myfs::{Dir, MyFileSystem};

pub fn format(block_size: u32, total_blocks: u32) -> (Arc<RamDisk>, MyFileSystem) {
    let dev = Arc::new(RamDisk::new((block_size * total_blocks) as usize));
    let fs = MyFileSystem::format(dev.clone(), block_size, total_blocks).unwrap();
    (dev, fs)
}

pub fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed))
        .collect()
}

/// 从根目录出发可达的块数，不含0号与1号块
#[allow(dead_code)]
pub fn used_blocks(fs: &MyFileSystem) -> usize {
    fs.chain_len(fs.root().head()).unwrap() - 1 + used_under(fs, fs.root())
}

fn used_under(fs: &MyFileSystem, dir: Dir) -> usize {
    dir.entries(fs)
        .unwrap()
        .into_iter()
        .map(|(entry, _)| {
            let own = fs.chain_len(entry.start_block).unwrap();
            if entry.is_dir() {
                own + used_under(fs, Dir::new(entry.start_block))
            } else {
                own
            }
        })
        .sum()
}
