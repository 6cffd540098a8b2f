use tracing::debug;

use crate::domain::connection::Connection;
use crate::domain::mac::{Direction, MacState};

/// Install `snapshot` as the active MAC context for `direction`.
///
/// The snapshot replaces the previous state as one value; the old secret is
/// wiped when it is dropped here.
pub fn copy_mac_state(conn: &mut Connection, snapshot: MacState, direction: Direction) {
    let previous = conn.replace_mac_state(direction, snapshot);
    drop(previous);
    debug!(?direction, "mac state installed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::key_exchange::DigestAlgorithm;
    use crate::test_support::dhe_rsa_context;

    #[test]
    fn replaces_only_the_given_direction() {
        let mut conn = Connection::new(dhe_rsa_context());
        let seq = 9u64.to_be_bytes();
        let snap = MacState::new(DigestAlgorithm::Sha256, &[7u8; 32], seq).unwrap();
        copy_mac_state(&mut conn, snap, Direction::Outbound);

        let out = conn.mac_state(Direction::Outbound);
        assert_eq!(out.digest(), Some(DigestAlgorithm::Sha256));
        assert_eq!(out.secret(), &[7u8; 32]);
        assert_eq!(out.secret_len(), 32);
        assert_eq!(out.sequence(), seq);
        assert_eq!(conn.mac_state(Direction::Inbound), &MacState::default());
    }

    #[test]
    fn shorter_secret_leaves_no_residue() {
        let mut conn = Connection::new(dhe_rsa_context());
        let long = MacState::new(DigestAlgorithm::Sha384, &[1u8; 48], [0; 8]).unwrap();
        copy_mac_state(&mut conn, long, Direction::Inbound);
        let short = MacState::new(DigestAlgorithm::Sha1, &[2u8; 20], [0; 8]).unwrap();
        copy_mac_state(&mut conn, short.clone(), Direction::Inbound);

        let active = conn.mac_state(Direction::Inbound);
        assert_eq!(active, &short);
        assert_eq!(active.secret(), &[2u8; 20]);
    }
}
