use std::cell::RefCell;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};

use block_dev::{BlockDevice, block_span};
use send_wrapper::SendWrapper;

/// 以宿主文件为后端的块设备，每次读写都是一次定位读写。
#[derive(Debug)]
pub struct BlockFile {
    inner: SendWrapper<RefCell<File>>,
}

impl BlockFile {
    pub fn new(fd: File) -> Self {
        Self {
            inner: SendWrapper::new(RefCell::new(fd)),
        }
    }
}

impl BlockDevice for BlockFile {
    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> io::Result<()> {
        let mut file = self.inner.borrow_mut();
        let (start, _) = block_span(block_id, buf.len())?;
        file.seek(SeekFrom::Start(start))?;
        file.read_exact(buf)
    }

    fn write_block(&self, block_id: usize, buf: &[u8]) -> io::Result<()> {
        let mut file = self.inner.borrow_mut();
        let (start, end) = block_span(block_id, buf.len())?;
        // 镜像长度在 mkfs 时定死，越界写入不得扩大文件
        if end > file.metadata()?.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("block {block_id} lies beyond the end of the image"),
            ));
        }
        file.seek(SeekFrom::Start(start))?;
        file.write_all(buf)
    }
}
