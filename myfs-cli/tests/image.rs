use std::fs;
use std::path::PathBuf;
use std::process;

use myfs::Error;
use myfs_cli::cli::Command;
use myfs_cli::run;

/// 测试结束时删除的临时镜像
struct Scratch(PathBuf);

impl Scratch {
    fn new(tag: &str) -> Self {
        let path = std::env::temp_dir().join(format!("myfs-{tag}-{}.img", process::id()));
        let _ = fs::remove_file(&path);
        Self(path)
    }

    fn at(&self, path: &str) -> String {
        format!("{path}@{}", self.0.display())
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        self.0.with_extension(suffix)
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.0);
    }
}

fn exec(command: Command) -> Result<String, Error> {
    let mut out = Vec::new();
    run(command, &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

fn mkfs(img: &Scratch, block_size: u32, total_blocks: u32) {
    exec(Command::Mkfs {
        fsfile: img.0.clone(),
        block_size,
        total_blocks,
    })
    .unwrap();
}

#[test]
fn mkfs_sizes_image() {
    let img = Scratch::new("mkfs");
    let out = exec(Command::Mkfs {
        fsfile: img.0.clone(),
        block_size: 128,
        total_blocks: 64,
    })
    .unwrap();

    assert_eq!(fs::metadata(&img.0).unwrap().len(), 128 * 64);
    assert!(out.contains("62 free"), "{out}");

    let info = exec(Command::Info {
        fsfile: img.0.clone(),
    })
    .unwrap();
    assert!(info.contains("Block Size: 128"));
    assert!(info.contains("Total Blocks: 64"));
    assert!(info.contains("First Free Block: 2"));
}

#[test]
fn mkfs_rejects_bad_geometry_before_touching_image() {
    let img = Scratch::new("geometry");
    mkfs(&img, 64, 8);
    let before = fs::read(&img.0).unwrap();

    for (block_size, total_blocks) in [(64, 1), (24, 8)] {
        assert!(matches!(
            exec(Command::Mkfs {
                fsfile: img.0.clone(),
                block_size,
                total_blocks,
            }),
            Err(Error::InvalidGeometry(_))
        ));
    }
    assert!(before == fs::read(&img.0).unwrap());
}

#[test]
fn state_survives_between_commands() {
    let img = Scratch::new("persist");
    mkfs(&img, 64, 32);

    let host_in = img.sibling("in");
    let host_out = img.sibling("out");
    let data: Vec<u8> = (0..300u32).map(|i| (i * 7 % 251) as u8).collect();
    fs::write(&host_in, &data).unwrap();

    exec(Command::Mkdir {
        target: img.at("/docs"),
    })
    .unwrap();
    exec(Command::CopyTo {
        linuxfile: host_in.clone(),
        target: img.at("/docs/blob"),
    })
    .unwrap();
    exec(Command::CopyFrom {
        source: img.at("/docs/blob"),
        linuxfile: host_out.clone(),
    })
    .unwrap();
    assert_eq!(fs::read(&host_out).unwrap(), data);

    let stat = exec(Command::Stat {
        target: img.at("/docs/blob"),
    })
    .unwrap();
    assert!(stat.contains("Type: File"));
    assert!(stat.contains("Size: 300 bytes"));
    // 每块60字节有效载荷
    assert!(stat.contains("Blocks: 5"));

    let listing = exec(Command::Ls {
        target: img.at("/docs"),
    })
    .unwrap();
    assert!(listing.trim_end().ends_with("blob"), "{listing}");

    exec(Command::Rm {
        target: img.at("/docs/blob"),
    })
    .unwrap();
    exec(Command::Rmdir {
        target: img.at("/docs"),
    })
    .unwrap();
    let info = exec(Command::Info {
        fsfile: img.0.clone(),
    })
    .unwrap();
    assert!(info.contains("Free Blocks: 30"), "{info}");

    let _ = fs::remove_file(host_in);
    let _ = fs::remove_file(host_out);
}

#[test]
fn readblock_dumps_hex() {
    let img = Scratch::new("dump");
    mkfs(&img, 64, 16);

    let host_in = img.sibling("in");
    fs::write(&host_in, [0xabu8; 100]).unwrap();
    exec(Command::CopyTo {
        linuxfile: host_in.clone(),
        target: img.at("/f"),
    })
    .unwrap();

    let dump = exec(Command::Readblock {
        source: img.at("/f"),
        block_no: 1,
    })
    .unwrap();
    let mut lines = dump.lines();
    assert!(lines.next().unwrap().starts_with("Block 1"));
    // 第二块载荷40字节，其后为零填充和链尾指针
    let rows: Vec<&str> = lines.collect();
    assert_eq!(rows.len(), 4);
    assert!(rows[0].starts_with("ab ab"));
    assert!(rows[3].ends_with("00 00 00 00"));

    assert!(matches!(
        exec(Command::Readblock {
            source: img.at("/f"),
            block_no: 2,
        }),
        Err(Error::NoSuchBlock(2))
    ));

    let _ = fs::remove_file(host_in);
}

#[test]
fn failures_leave_image_usable() {
    let img = Scratch::new("errors");
    mkfs(&img, 32, 8);

    assert!(matches!(
        exec(Command::Mkdir {
            target: "/a".into(),
        }),
        Err(Error::MalformedPath(_))
    ));
    assert!(matches!(
        exec(Command::Rm {
            target: img.at("/missing"),
        }),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        exec(Command::CopyTo {
            linuxfile: img.sibling("absent"),
            target: img.at("/x"),
        }),
        Err(Error::Io(_))
    ));
    assert!(matches!(
        exec(Command::Info {
            fsfile: img.sibling("nowhere"),
        }),
        Err(Error::Io(_))
    ));

    exec(Command::Mkdir {
        target: img.at("/a"),
    })
    .unwrap();
}
