//! # 命令层
//!
//! 组合路径解析、目录引擎与文件数据引擎，实现各条命令。
//! 任何一步失败都立即返回，已写入的块不回滚。

use core::fmt;

use crate::block::BlockId;
use crate::dir::{Dir, EntryPos};
use crate::layout::{Entry, EntryKind, Name};
use crate::{Error, MyFileSystem, Result};

/// 目录项的元信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stat {
    pub name: String,
    pub kind: EntryKind,
    pub start_block: BlockId,
    /// 文件字节数，目录为0
    pub size: u32,
    /// 链上的块数
    pub blocks: usize,
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "Type: {}", self.kind)?;
        writeln!(f, "Start Block: {}", self.start_block)?;
        writeln!(f, "Size: {} bytes", self.size)?;
        write!(f, "Blocks: {}", self.blocks)
    }
}

impl MyFileSystem {
    /// 将`data`存为`path`处的新文件
    pub fn copy_in(&mut self, path: &str, data: &[u8]) -> Result<Stat> {
        let (parent, name) = self.resolve(path)?;
        let name = name.ok_or_else(|| Error::NotAFile("/".into()))?;
        if parent.find(&name, self)?.is_some() {
            return Err(Error::AlreadyExists(path.to_owned()));
        }

        let (start, size) = self.write_file(data)?;
        let entry = Entry::new_file(name, start, size);
        parent.insert(&entry, self)?;

        log::info!("copied {size} bytes in as {path:?}");
        self.stat_entry(&entry)
    }

    /// 读出`path`处文件的全部内容
    pub fn copy_out(&self, path: &str) -> Result<Vec<u8>> {
        let (entry, _, _) = self.lookup_file(path)?;
        self.read_file(entry.start_block, entry.size)
    }

    pub fn remove_file(&mut self, path: &str) -> Result<()> {
        let (entry, parent, pos) = self.lookup_file(path)?;
        self.delete_chain(entry.start_block)?;
        parent.remove(pos, self)?;

        log::info!("removed file {path:?}");
        Ok(())
    }

    /// 在已存在的父目录下新建空目录
    pub fn make_dir(&mut self, path: &str) -> Result<Stat> {
        let (parent, name) = self.resolve(path)?;
        let name = name.ok_or_else(|| Error::AlreadyExists("/".into()))?;
        if parent.find(&name, self)?.is_some() {
            return Err(Error::AlreadyExists(path.to_owned()));
        }

        // 新分配的块已清零，即空目录
        let head = self.alloc_block()?;
        let entry = Entry::new_dir(name, head);
        parent.insert(&entry, self)?;

        log::info!("made directory {path:?} at block {head}");
        self.stat_entry(&entry)
    }

    /// 删除空目录，回收其整条目录链
    pub fn remove_dir(&mut self, path: &str) -> Result<()> {
        let (parent, name) = self.resolve(path)?;
        let name = name.ok_or_else(|| {
            Error::MalformedPath("the root directory cannot be removed".into())
        })?;
        let (entry, pos) = parent
            .find(&name, self)?
            .ok_or_else(|| Error::NotFound(path.to_owned()))?;
        if !entry.is_dir() {
            return Err(Error::NotADirectory(path.to_owned()));
        }
        if !Dir::new(entry.start_block).is_empty(self)? {
            return Err(Error::NotEmpty(path.to_owned()));
        }

        self.delete_chain(entry.start_block)?;
        parent.remove(pos, self)?;

        log::info!("removed directory {path:?}");
        Ok(())
    }

    pub fn stat(&self, path: &str) -> Result<Stat> {
        let (parent, name) = self.resolve(path)?;
        let Some(name) = name else {
            return Ok(Stat {
                name: "/".into(),
                kind: EntryKind::Directory,
                start_block: self.root().head(),
                size: 0,
                blocks: self.chain_len(self.root().head())?,
            });
        };
        let (entry, _) = parent
            .find(&name, self)?
            .ok_or_else(|| Error::NotFound(path.to_owned()))?;

        self.stat_entry(&entry)
    }

    /// 按槽位顺序列出目录下的活动目录项
    pub fn list_dir(&self, path: &str) -> Result<Vec<Stat>> {
        let dir = match self.resolve(path)? {
            (root, None) => root,
            (parent, Some(name)) => {
                let (entry, _) = parent
                    .find(&name, self)?
                    .ok_or_else(|| Error::NotFound(path.to_owned()))?;
                if !entry.is_dir() {
                    return Err(Error::NotADirectory(path.to_owned()));
                }
                Dir::new(entry.start_block)
            }
        };

        dir.entries(self)?
            .iter()
            .map(|(entry, _)| self.stat_entry(entry))
            .collect()
    }

    /// 文件数据链上第`n`块（从0数起）的原始内容
    pub fn read_file_block(&self, path: &str, n: usize) -> Result<Vec<u8>> {
        let (entry, _, _) = self.lookup_file(path)?;
        Ok(self.read_nth_block(entry.start_block, n)?.as_slice().to_vec())
    }
}

impl MyFileSystem {
    fn lookup_file(&self, path: &str) -> Result<(Entry, Dir, EntryPos)> {
        let (parent, name) = self.resolve(path)?;
        let name: Name = name.ok_or_else(|| Error::NotAFile("/".into()))?;
        let (entry, pos) = parent
            .find(&name, self)?
            .ok_or_else(|| Error::NotFound(path.to_owned()))?;
        if !entry.is_file() {
            return Err(Error::NotAFile(path.to_owned()));
        }

        Ok((entry, parent, pos))
    }

    fn stat_entry(&self, entry: &Entry) -> Result<Stat> {
        Ok(Stat {
            name: entry.name.to_string(),
            kind: entry.kind,
            start_block: entry.start_block,
            size: entry.size,
            blocks: self.chain_len(entry.start_block)?,
        })
    }
}
