//! # 路径解析层
//!
//! 路径以`/`分隔，空分量一律忽略，因此首尾或重复的`/`都无妨。
//! 除最后一个分量外逐级下降，最后一个分量原样交给调用者去查找、插入或删除。

use std::path::PathBuf;
use std::str::FromStr;

use crate::dir::Dir;
use crate::layout::Name;
use crate::{Error, MyFileSystem, Result};

/// 命令行中的`<path>@<fsfile>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// 文件系统内的路径
    pub path: String,
    /// 宿主上的镜像文件
    pub image: PathBuf,
}

impl FromStr for Location {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let Some((path, image)) = s.split_once('@') else {
            return Err(Error::MalformedPath(format!("'{s}' lacks the '@' separator")));
        };
        if image.contains('@') {
            return Err(Error::MalformedPath(format!("'{s}' has more than one '@'")));
        }
        if image.is_empty() {
            return Err(Error::MalformedPath(format!("'{s}' names no filesystem image")));
        }

        Ok(Self {
            path: path.to_owned(),
            image: PathBuf::from(image),
        })
    }
}

/// 非空的路径分量
pub fn components(path: &str) -> impl DoubleEndedIterator<Item = &str> {
    path.split('/').filter(|cmp| !cmp.is_empty())
}

impl MyFileSystem {
    /// 解析出父目录与最后一个分量；路径指向根目录时分量为`None`。
    pub fn resolve(&self, path: &str) -> Result<(Dir, Option<Name>)> {
        let mut cmps = components(path);
        let Some(basename) = cmps.next_back() else {
            return Ok((self.root(), None));
        };

        let mut dir = self.root();
        let mut walked = String::new();
        for cmp in cmps {
            let name = Name::new(cmp)?;
            walked.push('/');
            walked.push_str(cmp);

            let (entry, _) = dir
                .find(&name, self)?
                .ok_or_else(|| Error::NotFound(walked.clone()))?;
            if !entry.is_dir() {
                log::debug!("middle segment {walked} isn't a directory");
                return Err(Error::NotADirectory(walked));
            }
            dir = Dir::new(entry.start_block);
        }

        let basename = Name::new(basename)?;
        log::debug!("resolved {path:?} to dir {} + {basename:?}", dir.head());
        Ok((dir, Some(basename)))
    }
}
