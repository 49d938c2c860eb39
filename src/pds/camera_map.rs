/// Reduces an upstream PDS instrument identifier to the canonical camera
/// short name used across the rest of the crate. Unknown instruments pass
/// through unchanged (as uppercase) so the repository's auto-create policy
/// (§4.4) can still record them under a sensible name.
///
/// Idempotent: `map(map(x)) == map(x)`, since every output of this function
/// is either already a key's value (a no-op on the second pass) or an
/// upper-cased passthrough (also a no-op on the second pass).
pub fn map_camera_name(instrument: &str) -> String {
    let upper = instrument.to_uppercase();
    match upper.as_str() {
        "PANCAM_LEFT" | "PANCAM_RIGHT" | "PANCAM" => "PANCAM",
        "FRONT_HAZCAM_LEFT" | "FRONT_HAZCAM_RIGHT" | "FHAZ" => "FHAZ",
        "REAR_HAZCAM_LEFT" | "REAR_HAZCAM_RIGHT" | "RHAZ" => "RHAZ",
        "MI" | "MINITES" => "MINITES",
        "DESCAM" | "ENTRY" => "ENTRY",
        _ => return upper,
    }
    .to_owned()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn maps_known_instruments() {
        assert_eq!(map_camera_name("PANCAM_LEFT"), "PANCAM");
        assert_eq!(map_camera_name("front_hazcam_left"), "FHAZ");
        assert_eq!(map_camera_name("REAR_HAZCAM_RIGHT"), "RHAZ");
        assert_eq!(map_camera_name("MI"), "MINITES");
        assert_eq!(map_camera_name("DESCAM"), "ENTRY");
    }

    #[test]
    fn is_idempotent() {
        for name in ["PANCAM_LEFT", "MI", "DESCAM", "SOME_UNKNOWN_CAM"] {
            let once = map_camera_name(name);
            let twice = map_camera_name(&once);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn unknown_instrument_passes_through_uppercased() {
        assert_eq!(map_camera_name("some_unknown_cam"), "SOME_UNKNOWN_CAM");
    }
}
