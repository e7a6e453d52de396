//! Wire-level cast request, as delivered by the gate into a zone inbox.

use glam::DVec3;
use uid_core::Uid;

#[derive(Debug, Clone, Default)]
pub struct CastRequest {
    pub cid: i64,
    pub sub_cid: i64,
    /// Query point for point-targeted skills.
    pub pos: Option<DVec3>,
    /// Cast direction for cone/rect selection and movement effects.
    pub dir: Option<DVec3>,
    /// Locked unit for unit-targeted skills.
    pub lock_target: Uid,
}

impl CastRequest {
    pub fn at_point(cid: i64, pos: DVec3) -> CastRequest {
        CastRequest {
            cid,
            pos: Some(pos),
            ..Default::default()
        }
    }

    pub fn on_unit(cid: i64, lock_target: Uid) -> CastRequest {
        CastRequest {
            cid,
            lock_target,
            ..Default::default()
        }
    }
}
