use femd_buffer::{BufferPool, Owner, PoolError};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Op {
    Give,
    Return(usize),
}

fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(prop_oneof![Just(Op::Give), (0usize..8).prop_map(Op::Return)], 0..200)
}

proptest! {
    #[test]
    fn pool_invariant_holds_under_random_give_return_sequences(ops in arb_ops()) {
        const SLOTS: usize = 8;
        let mut pool = BufferPool::new(SLOTS, 32);
        let mut outstanding: Vec<usize> = Vec::new();

        for op in ops {
            match op {
                Op::Give => match pool.give(Owner::AutoReturned) {
                    Ok(addr) => outstanding.push(addr),
                    Err(PoolError::NoFree) => prop_assert_eq!(pool.free_cnt(), 0),
                    Err(other) => prop_assert!(false, "unexpected give error: {:?}", other),
                },
                Op::Return(i) => {
                    if !outstanding.is_empty() {
                        let idx = i % outstanding.len();
                        let addr = outstanding.remove(idx);
                        pool.give_back(addr).unwrap();
                    }
                }
            }
            // free_cnt must always equal the number of slots not currently outstanding.
            prop_assert_eq!(pool.free_cnt(), SLOTS - outstanding.len());
        }
    }
}

#[test]
fn give_never_hands_out_the_same_address_twice_concurrently() {
    let mut pool = BufferPool::new(4, 32);
    let mut seen = std::collections::HashSet::new();
    for _ in 0..4 {
        let addr = pool.give(Owner::UserReturned).unwrap();
        assert!(seen.insert(addr), "duplicate address handed out while pool not exhausted");
    }
    assert_eq!(pool.give(Owner::UserReturned), Err(PoolError::NoFree));
}
