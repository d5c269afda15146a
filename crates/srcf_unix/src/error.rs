//! Error type for UNIX/NIS/NFS plumbing primitives.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, UnixError>;

#[derive(Debug, Error)]
pub enum UnixError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{program} exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error(transparent)]
    HostGuard(#[from] srcf_task::HostGuardError),

    #[error(
        "chown on {path} returned EINVAL: the NFS server {server} (version {nfs_version}) \
         has not yet learned uid/gid {uid}/{gid}; wait for its idmap cache to refresh, or \
         restart rpc.idmapd on {server}"
    )]
    NfsServerStale {
        path: String,
        server: String,
        nfs_version: String,
        uid: u32,
        gid: u32,
    },

    #[error("chown on {path} returned EINVAL and no NFS mount owning it could be identified")]
    NfsServerUnknown { path: String },

    #[error("{0}")]
    Other(String),
}
