/// 挂载表解析与磁盘过滤
///
/// 只保留真实的块设备文件系统：
/// 1. 跳过虚拟/伪文件系统类型
/// 2. 跳过 overlay、bind、用户运行时目录和包管理器存储路径
/// 3. 跳过无法 statvfs 或总容量不超过 100 MiB 的分区

use common::DiskSnapshot;
use tracing::trace;

/// 最小磁盘容量（不含）
pub const MIN_DISK_SIZE: u64 = 100 * 1024 * 1024;

const VIRTUAL_FS_TYPES: &[&str] = &[
    "proc",
    "sysfs",
    "devpts",
    "tmpfs",
    "cgroup",
    "cgroup2",
    "pstore",
    "securityfs",
    "devtmpfs",
    "debugfs",
    "hugetlbfs",
    "mqueue",
    "fusectl",
    "overlay",
];

const EXCLUDED_PATH_PREFIXES: &[&str] = &[
    "/etc/nixmodules",
    "/mnt/nixmodules",
    "/nix",
    "/run/user",
];

const EXCLUDED_DEVICE_PATTERNS: &[&str] = &["tmpfs", "overlay"];

/// 挂载表中的一项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountEntry {
    pub device: String,
    pub mountpoint: String,
    pub fs_type: String,
    pub options: String,
}

/// 文件系统容量（字节）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsUsage {
    pub total: u64,
    pub used: u64,
    pub available: u64,
}

/// 解析 fstab 格式的挂载表（/etc/mtab、/proc/mounts）
pub fn parse_mount_table(content: &str) -> Vec<MountEntry> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let device = fields.next()?;
            let mountpoint = fields.next()?;
            let fs_type = fields.next()?;
            let options = fields.next().unwrap_or("");
            Some(MountEntry {
                device: unescape_octal(device),
                mountpoint: unescape_octal(mountpoint),
                fs_type: fs_type.to_string(),
                options: options.to_string(),
            })
        })
        .collect()
}

/// 还原挂载表中的八进制转义（例如 `\040` 表示空格）
fn unescape_octal(field: &str) -> String {
    if !field.contains('\\') {
        return field.to_string();
    }

    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let digits = bytes.get(i + 1..i + 4);
        if let (b'\\', Some(digits)) = (bytes[i], digits) {
            let code = digits.iter().try_fold(0u32, |acc, &b| {
                matches!(b, b'0'..=b'7').then(|| acc * 8 + u32::from(b - b'0'))
            });
            if let Some(byte) = code.and_then(|c| u8::try_from(c).ok()) {
                out.push(byte);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn path_matches_prefix(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// 是否属于需要排除的挂载项
pub fn is_excluded(entry: &MountEntry) -> bool {
    let fs_type = entry.fs_type.as_str();
    if VIRTUAL_FS_TYPES.contains(&fs_type) || fs_type.contains("fuse") {
        return true;
    }

    if EXCLUDED_PATH_PREFIXES
        .iter()
        .any(|prefix| path_matches_prefix(&entry.mountpoint, prefix))
    {
        return true;
    }

    if EXCLUDED_DEVICE_PATTERNS
        .iter()
        .any(|pattern| entry.device.contains(pattern))
    {
        return true;
    }

    entry.options.split(',').any(|opt| opt == "bind")
}

/// 通过 statvfs 获取容量，失败返回 None
pub fn statvfs_usage(path: &str) -> Option<FsUsage> {
    let stat = nix::sys::statvfs::statvfs(path).ok()?;

    let fragment = stat.fragment_size() as u64;
    let blocks = stat.blocks() as u64;
    let free = stat.blocks_free() as u64;
    let available = stat.blocks_available() as u64;

    Some(FsUsage {
        total: blocks.saturating_mul(fragment),
        used: blocks.saturating_sub(free).saturating_mul(fragment),
        available: available.saturating_mul(fragment),
    })
}

/// 过滤挂载项并生成磁盘快照
///
/// 同一挂载点出现多次时以最后一项（最上层挂载）为准，保留首次出现的位置
pub fn collect_disks<F>(entries: &[MountEntry], stat: F) -> Vec<DiskSnapshot>
where
    F: Fn(&str) -> Option<FsUsage>,
{
    let mut disks: Vec<DiskSnapshot> = Vec::new();

    for entry in entries {
        if is_excluded(entry) {
            trace!("跳过挂载点 {} ({})", entry.mountpoint, entry.fs_type);
            continue;
        }

        let Some(usage) = stat(&entry.mountpoint) else {
            trace!("无法获取 {} 的容量", entry.mountpoint);
            continue;
        };

        if usage.total <= MIN_DISK_SIZE {
            trace!("挂载点 {} 容量过小，跳过", entry.mountpoint);
            continue;
        }

        let disk = DiskSnapshot::new(
            entry.device.clone(),
            entry.mountpoint.clone(),
            entry.fs_type.clone(),
            usage.total,
            usage.used,
            usage.available,
        );

        match disks.iter_mut().find(|d| d.mountpoint == disk.mountpoint) {
            Some(existing) => *existing = disk,
            None => disks.push(disk),
        }
    }

    disks
}
