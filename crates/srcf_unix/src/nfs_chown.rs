//! `chown` wrapper that turns the NFS server's "I don't know that uid/gid
//! yet" `EINVAL` into an explanatory error instead of a bare OS error.

use nix::errno::Errno;
use nix::unistd::{chown, Gid, Uid};

use crate::error::{Result, UnixError};

/// Identifies the NFS server backing the mount that owns `path`, by
/// scanning `/proc/net/nfsfs/servers` (hostname/IP column) paired with
/// `/proc/net/nfsfs/volumes` (version column) for the matching mount.
/// Returns `None` if `path` isn't under an NFS mount this process can see.
fn identify_nfs_server(path: &str) -> Option<(String, String)> {
    let volumes = std::fs::read_to_string("/proc/net/nfsfs/volumes").ok()?;
    let servers = std::fs::read_to_string("/proc/net/nfsfs/servers").ok()?;

    // volumes: "NV SERVER PORT DEV FSID FSC" (header line first)
    let mount_dev = find_mount_device(path)?;
    let mut server_addr = None;
    let mut version = None;
    for line in volumes.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() >= 4 && fields[3] == mount_dev {
            server_addr = Some(fields[1].to_string());
            version = Some(fields[0].to_string());
            break;
        }
    }
    let server_addr = server_addr?;

    // servers: "NV SERVER PORT ... FS" (header line first)
    for line in servers.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() >= 2 && fields[1] == server_addr {
            return Some((server_addr, version.unwrap_or_default()));
        }
    }
    Some((server_addr, version.unwrap_or_default()))
}

fn find_mount_device(path: &str) -> Option<String> {
    let mounts = std::fs::read_to_string("/proc/mounts").ok()?;
    let mut best: Option<(String, String)> = None;
    for line in mounts.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 3 {
            continue;
        }
        let mount_point = fields[1];
        if !fields[2].starts_with("nfs") {
            continue;
        }
        if path.starts_with(mount_point) {
            if best.as_ref().map(|(mp, _)| mount_point.len() > mp.len()).unwrap_or(true) {
                best = Some((mount_point.to_string(), fields[0].to_string()));
            }
        }
    }
    best.map(|(_, dev)| dev)
}

/// `chown(path, uid, gid)`, translating `EINVAL` into
/// [`UnixError::NfsServerStale`]/[`UnixError::NfsServerUnknown`] rather
/// than a bare OS error — `EINVAL` from chown almost always means the NFS
/// server hasn't yet picked up a uid/gid this process just created.
pub fn nfs_aware_chown(path: &str, uid: u32, gid: u32) -> Result<()> {
    match chown(path, Some(Uid::from_raw(uid)), Some(Gid::from_raw(gid))) {
        Ok(()) => Ok(()),
        Err(Errno::EINVAL) => match identify_nfs_server(path) {
            Some((server, version)) => Err(UnixError::NfsServerStale {
                path: path.to_string(),
                server,
                nfs_version: version,
                uid,
                gid,
            }),
            None => Err(UnixError::NfsServerUnknown { path: path.to_string() }),
        },
        Err(e) => Err(UnixError::Other(format!("chown {path}: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_mount_device_picks_longest_matching_prefix() {
        let mounts = "\
fileserver:/export/home /home nfs4 rw 0 0
fileserver:/export/home/spqr2 /home/spqr2 nfs4 rw 0 0
";
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proc_mounts");
        std::fs::write(&path, mounts).unwrap();
        // exercised indirectly through identify_nfs_server in integration
        // contexts; here we confirm the prefix-matching logic in isolation
        // by reimplementing the scan against our temp file.
        let contents = std::fs::read_to_string(&path).unwrap();
        let mut best: Option<(String, String)> = None;
        for line in contents.lines() {
            let fields: Vec<&str> = line.split_whitespace().collect();
            let mount_point = fields[1];
            if "/home/spqr2/public_html".starts_with(mount_point)
                && best.as_ref().map(|(mp, _)| mount_point.len() > mp.len()).unwrap_or(true)
            {
                best = Some((mount_point.to_string(), fields[0].to_string()));
            }
        }
        assert_eq!(best.unwrap().1, "fileserver:/export/home/spqr2");
    }
}
