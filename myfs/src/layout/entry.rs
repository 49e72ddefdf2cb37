use core::fmt;
use std::io::Cursor;

use binrw::{BinRead, BinWrite, binrw};

use crate::{BlockId, Error, NAME_LEN, Result};

#[binrw]
#[brw(repr = u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File = 1,
    Directory = 2,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntryKind::File => "File",
            EntryKind::Directory => "Directory",
        })
    }
}

/// 以NUL补齐的12字节名称。
///
/// 长度为1..=12字节，且不含`/`与NUL；超长的名称一律拒绝，不做截断。
#[binrw]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Name([u8; NAME_LEN]);

impl Name {
    pub fn new(name: &str) -> Result<Self> {
        let bytes = name.as_bytes();
        if bytes.is_empty() {
            return Err(Error::MalformedPath("empty name".into()));
        }
        if bytes.len() > NAME_LEN {
            return Err(Error::MalformedPath(format!(
                "'{name}' is longer than {NAME_LEN} bytes"
            )));
        }
        if bytes.iter().any(|&b| b == b'/' || b == 0) {
            return Err(Error::MalformedPath(format!(
                "'{}' contains a forbidden byte",
                name.escape_debug()
            )));
        }

        let mut raw = [0; NAME_LEN];
        raw[..bytes.len()].copy_from_slice(bytes);
        Ok(Self(raw))
    }

    /// 去掉补齐的NUL
    pub fn as_bytes(&self) -> &[u8] {
        let len = self.0.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
        &self.0[..len]
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.as_bytes()))
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", String::from_utf8_lossy(self.as_bytes()))
    }
}

/// 目录项：描述目录中的一个文件或子目录。
///
/// `start_block`是该项自己的块链表头：文件指向数据链，目录指向目录链。
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub name: Name,
    pub kind: EntryKind,
    pub start_block: BlockId,
    /// 文件的字节数；目录恒为0
    pub size: u32,
}

impl Entry {
    pub fn new_file(name: Name, start_block: BlockId, size: u32) -> Self {
        Self {
            name,
            kind: EntryKind::File,
            start_block,
            size,
        }
    }

    pub fn new_dir(name: Name, start_block: BlockId) -> Self {
        Self {
            name,
            kind: EntryKind::Directory,
            start_block,
            size: 0,
        }
    }

    /// 解码一个槽位，空闲槽位为`None`。
    pub fn decode(slot: &[u8]) -> Result<Option<Self>> {
        if is_free_slot(slot) {
            return Ok(None);
        }
        Ok(Some(Self::read(&mut Cursor::new(slot))?))
    }

    pub fn encode(&self, slot: &mut [u8]) -> Result<()> {
        Ok(self.write(&mut Cursor::new(slot))?)
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    #[inline]
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// 名称首字节为0的槽位是空闲的（墓碑）
#[inline]
pub fn is_free_slot(slot: &[u8]) -> bool {
    slot.first().is_none_or(|&b| b == 0)
}
