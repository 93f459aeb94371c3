use femd_codec::prefix::START_OF_DFRAME;
use femd_proxy::{FemProxy, FrameOutcome};
use std::net::SocketAddr;

fn dframe_with_seq(seq: u8, reset: bool) -> Vec<u8> {
    let mut buf = vec![0u8; 8];
    let seq_word: u16 = (seq as u16) | if reset { 0x0100 } else { 0 };
    buf[0..2].copy_from_slice(&seq_word.to_be_bytes());
    buf[2..4].copy_from_slice(&START_OF_DFRAME.to_be_bytes());
    buf
}

#[test]
fn scenario_s3_sequence_loss() {
    let bind: SocketAddr = "127.0.0.1:0".parse().unwrap();
    let server = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
    let mut proxy = FemProxy::open(0, bind, server.local_addr().unwrap()).unwrap();

    for (seq, reset) in [(0x00u8, true), (0x01u8, false), (0x03u8, false)] {
        let mut buf = dframe_with_seq(seq, reset);
        let n = buf.len();
        let outcome = proxy.process_frame(&mut buf, n).unwrap();
        assert!(matches!(outcome, FrameOutcome::Data { .. }));
    }

    assert_eq!(proxy.daq_reply_loss_cnt, 1);
    assert_eq!(proxy.exp_rep_nb(), 0x04);
}
