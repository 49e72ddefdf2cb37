use std::io;

use spin::Mutex;

use crate::{BlockDevice, block_span};

/// 内存中的定长字节区域，充当块设备。
#[derive(Debug)]
pub struct RamDisk {
    data: Mutex<Vec<u8>>,
}

impl RamDisk {
    pub fn new(len: usize) -> Self {
        Self {
            data: Mutex::new(vec![0; len]),
        }
    }

    pub fn len(&self) -> usize {
        self.data.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 复制出整个区域的内容
    pub fn snapshot(&self) -> Vec<u8> {
        self.data.lock().clone()
    }
}

impl BlockDevice for RamDisk {
    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> io::Result<()> {
        let data = self.data.lock();
        let (start, end) = block_span(block_id, buf.len())?;
        if end > data.len() as u64 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("block {block_id} lies beyond the end of the disk"),
            ));
        }
        buf.copy_from_slice(&data[start as usize..end as usize]);

        Ok(())
    }

    fn write_block(&self, block_id: usize, buf: &[u8]) -> io::Result<()> {
        let mut data = self.data.lock();
        let (start, end) = block_span(block_id, buf.len())?;
        if end > data.len() as u64 {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("block {block_id} lies beyond the end of the disk"),
            ));
        }
        data[start as usize..end as usize].copy_from_slice(buf);

        Ok(())
    }
}
