//! # 块设备接口层
//!
//! 块设备是以**块**为单位存储数据的设备；
//! [`BlockDevice`] 就是对读写块设备的抽象，
//! 实现了此特质的类型称为**块设备驱动**。
//!
//! 块的大小不由设备决定：每次读写时缓冲区的长度即块大小，
//! 第`block_id`块位于字节偏移`block_id * buf.len()`处。
//! 因此在得知块大小之前，也能用一个较小的缓冲区读出0号块的开头。

mod ram_disk;

use core::any::Any;
use core::fmt::Debug;
use std::io;

pub use self::ram_disk::RamDisk;

/// 块设备驱动特质
///
/// 不做任何缓存，每次调用都直接落到底层存储上。
pub trait BlockDevice: Send + Sync + Any + Debug {
    /// 读出整块。底层存储不足`(block_id + 1) * buf.len()`字节时报错。
    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> io::Result<()>;

    /// 写入整块，写不完整即报错。
    fn write_block(&self, block_id: usize, buf: &[u8]) -> io::Result<()>;
}

/// 块在底层存储中的字节区间，溢出时报错。
pub fn block_span(block_id: usize, block_size: usize) -> io::Result<(u64, u64)> {
    let start = block_id
        .checked_mul(block_size)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "block offset overflow"))?;
    let end = start
        .checked_add(block_size)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "block offset overflow"))?;

    Ok((start as u64, end as u64))
}
