use femd_codec::event::{extract_envelope, EventEnvelope};
use femd_codec::item::split_u32;
use proptest::prelude::*;

proptest! {
    #[test]
    fn envelope_round_trips(ev_ty in 0u8..8, ev_nb in any::<u32>(), ts in 0u64..(1u64 << 48)) {
        let env = EventEnvelope { ev_ty, ev_nb, ts };
        let tail = femd_codec::event::encode_envelope(&env);
        let (decoded, consumed) = extract_envelope(ev_ty, &tail).unwrap();
        prop_assert_eq!(decoded, env);
        prop_assert_eq!(consumed, 5);
    }
}

#[test]
fn ev_nb_is_assembled_low_word_first() {
    let (lo, hi) = split_u32(0x0002_0001);
    let tail = [0, 0, 0, lo, hi];
    let (env, _) = extract_envelope(0, &tail).unwrap();
    assert_eq!(env.ev_nb, 0x0002_0001);
}
