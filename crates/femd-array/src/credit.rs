//! Per-card DAQ request planning: how much credit a card can claim this
//! round, and the bookkeeping that follows issuing the request.

use crate::daq::DaqAccounting;
use femd_proxy::FemProxy;

/// A planned `daq` command for one card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaqRequest {
    pub size: u32,
    /// `None` omits the sequence-number argument (signals a sequence reset).
    pub seq: Option<u8>,
}

/// Decide whether `proxy` can issue a new request this round, and for how
/// much. Returns `None` when `req_credit < req_threshold` (gated).
pub fn plan_request(proxy: &FemProxy, acc: &DaqAccounting) -> Option<DaqRequest> {
    if proxy.req_credit < proxy.req_threshold {
        return None;
    }
    let size = acc.requestable(proxy.req_credit);
    let seq = if proxy.is_first_req { None } else { Some(proxy.req_seq_nb) };
    Some(DaqRequest { size, seq })
}

/// Apply the bookkeeping side effects of having issued `req` on `proxy`:
/// debit credit, credit pending-receive, bump the sequence counter, and
/// re-arm `is_first_req` when the request asked for zero bytes so the next
/// session starts clean.
pub fn apply_request(proxy: &mut FemProxy, req: DaqRequest) {
    proxy.req_credit = proxy.req_credit.saturating_sub(req.size);
    proxy.pnd_recv += req.size;
    proxy.req_seq_nb = proxy.req_seq_nb.wrapping_add(1);
    if req.seq.is_none() {
        proxy.is_first_req = false;
    }
    if req.size == 0 {
        proxy.is_first_req = true;
    }
}

/// Build the wire command text for a planned request.
pub fn format_command(req: &DaqRequest, unit: crate::daq::CredUnit) -> String {
    match req.seq {
        Some(seq) => format!("daq 0x{:x} {} 0x{:02x}", req.size, unit.letter(), seq),
        None => format!("daq 0x{:x} {}", req.size, unit.letter()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use femd_proxy::FemProxy;
    use std::net::SocketAddr;

    fn proxy() -> FemProxy {
        let bind: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let server = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
        FemProxy::open(0, bind, server.local_addr().unwrap()).unwrap()
    }

    #[test]
    fn scenario_s4_daq_credit_exhaustion() {
        let mut p = proxy();
        p.req_credit = 0x4000;
        p.req_threshold = 0x2000;
        let mut acc = DaqAccounting::default();
        acc.apply(crate::daq::DaqArg::NewSession(0x10000));

        // First SendDaq grants the full 0x4000 credit.
        let req = plan_request(&p, &acc).unwrap();
        assert_eq!(req.size, 0x4000);
        apply_request(&mut p, req);
        assert_eq!(p.req_credit, 0);

        // Credit exhausted; below threshold, no further request until recycled.
        assert!(plan_request(&p, &acc).is_none());

        // First card reply of 0x2000 bytes recycles back into req_credit.
        p.req_credit += 0x2000;
        let req2 = plan_request(&p, &acc).unwrap();
        assert_eq!(req2.size, 0x2000);
    }

    #[test]
    fn request_below_threshold_is_gated() {
        let mut p = proxy();
        p.req_credit = 0x1000;
        p.req_threshold = 0x2000;
        let acc = DaqAccounting { daq_size_left: 0x10000, ..Default::default() };
        assert!(plan_request(&p, &acc).is_none());
    }

    #[test]
    fn first_request_omits_sequence_argument() {
        let mut p = proxy();
        p.req_credit = 0x4000;
        p.req_threshold = 0x2000;
        p.is_first_req = true;
        let acc = DaqAccounting { daq_size_left: 0x10000, ..Default::default() };
        let req = plan_request(&p, &acc).unwrap();
        assert_eq!(req.seq, None);
        apply_request(&mut p, req);
        assert!(!p.is_first_req);
    }

    #[test]
    fn zero_size_request_rearms_first_req() {
        let mut p = proxy();
        p.req_credit = 0x4000;
        p.req_threshold = 0x2000;
        p.is_first_req = false;
        let acc = DaqAccounting::default(); // daq_size_left == 0
        let req = plan_request(&p, &acc).unwrap();
        assert_eq!(req.size, 0);
        apply_request(&mut p, req);
        assert!(p.is_first_req);
    }
}
