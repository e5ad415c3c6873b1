use firmware_cache::{CacheBackend, CacheController, CacheState, Cr0};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Op {
    Read,
    Write(u64),
    Invd,
    Wbinvd,
}

/// CR0 in a plain integer, with every backend call logged in order.
struct Recorder {
    cr0: u64,
    ops: Vec<Op>,
}

impl Recorder {
    fn new(cr0: u64) -> Self {
        Self {
            cr0,
            ops: Vec::new(),
        }
    }
}

impl CacheBackend for Recorder {
    unsafe fn read_cr0(&mut self) -> Cr0 {
        self.ops.push(Op::Read);
        Cr0::from_bits(self.cr0)
    }

    unsafe fn write_cr0(&mut self, value: Cr0) {
        self.ops.push(Op::Write(value.into_bits()));
        self.cr0 = value.into_bits();
    }

    unsafe fn invd(&mut self) {
        self.ops.push(Op::Invd);
    }

    unsafe fn wbinvd(&mut self) {
        self.ops.push(Op::Wbinvd);
    }
}

const CD: u64 = 0x4000_0000;
const NW: u64 = 0x2000_0000;

const PRIOR_VALUES: [u64; 6] = [
    0x0000_0000,
    0x6000_0000,
    0x8000_0033,
    0xE005_003B,
    0xFFFF_FFFF,
    0xFFFF_FFFF_FFFF_FFFF,
];

#[test]
fn enable_clears_cd_and_nw_from_any_start() {
    for prior in PRIOR_VALUES {
        let mut ctl = CacheController::new(Recorder::new(prior));
        unsafe { ctl.enable() };

        let cr0 = unsafe { ctl.read_control() };
        assert_eq!(cr0.into_bits() & (CD | NW), 0, "prior {prior:#x}");
        assert_eq!(unsafe { ctl.state() }, CacheState::Enabled);
    }
}

#[test]
fn enable_does_not_flush() {
    let mut ctl = CacheController::new(Recorder::new(0x6000_0011));
    unsafe { ctl.enable() };
    assert_eq!(ctl.into_inner().ops, vec![Op::Read, Op::Write(0x0000_0011)]);
}

#[test]
fn disable_flushes_around_the_write() {
    let mut ctl = CacheController::new(Recorder::new(0x8000_0011));
    unsafe { ctl.disable() };

    let rec = ctl.into_inner();
    assert_eq!(
        rec.ops,
        vec![Op::Read, Op::Wbinvd, Op::Write(0xC000_0011), Op::Wbinvd]
    );
    assert_eq!(rec.cr0 & CD, CD);
}

#[test]
fn disable_sets_cd_from_any_start() {
    for prior in PRIOR_VALUES {
        let mut ctl = CacheController::new(Recorder::new(prior));
        unsafe { ctl.disable() };
        let cr0 = unsafe { ctl.read_control() };
        assert!(cr0.cd_cache_disable(), "prior {prior:#x}");
        assert_eq!(cr0.into_bits() & !CD, prior & !CD);
        assert!(!ctl.into_inner().ops.contains(&Op::Invd));
    }
}

#[test]
fn enable_is_idempotent() {
    for prior in PRIOR_VALUES {
        let mut once = CacheController::new(Recorder::new(prior));
        unsafe { once.enable() };

        let mut twice = CacheController::new(Recorder::new(prior));
        unsafe {
            twice.enable();
            twice.enable();
        }
        assert_eq!(once.into_inner().cr0, twice.into_inner().cr0);
    }
}

#[test]
fn disable_is_idempotent() {
    for prior in PRIOR_VALUES {
        let mut once = CacheController::new(Recorder::new(prior));
        unsafe { once.disable() };

        let mut twice = CacheController::new(Recorder::new(prior));
        unsafe {
            twice.disable();
            twice.disable();
        }
        assert_eq!(once.into_inner().cr0, twice.into_inner().cr0);
    }
}

#[test]
fn enable_after_disable_preserves_unrelated_bits() {
    for prior in PRIOR_VALUES {
        let mut ctl = CacheController::new(Recorder::new(prior));
        unsafe {
            ctl.disable();
            ctl.enable();
        }
        let cr0 = ctl.into_inner().cr0;
        assert_eq!(cr0 & (CD | NW), 0);
        assert_eq!(cr0, prior & !(CD | NW), "prior {prior:#x}");
    }
}

#[test]
fn invalidate_forms_map_to_distinct_instructions() {
    let mut ctl = CacheController::new(Recorder::new(0));
    unsafe {
        ctl.invalidate();
        ctl.write_back_invalidate();
    }
    assert_eq!(ctl.into_inner().ops, vec![Op::Invd, Op::Wbinvd]);
}

#[test]
fn write_control_is_verbatim() {
    let mut ctl = CacheController::new(Recorder::new(0));
    unsafe { ctl.write_control(Cr0::from_bits(0xDEAD_BEEF_6000_0001)) };
    assert_eq!(
        unsafe { ctl.read_control() }.into_bits(),
        0xDEAD_BEEF_6000_0001
    );
}

#[test]
fn with_disabled_restores_enabled_cache() {
    let mut ctl = CacheController::new(Recorder::new(0x8000_0011));
    let seen = unsafe { ctl.with_disabled(|| 42) };
    assert_eq!(seen, 42);

    let rec = ctl.into_inner();
    assert_eq!(rec.cr0, 0x8000_0011);
    assert_eq!(
        rec.ops,
        vec![
            Op::Read,
            Op::Read,
            Op::Wbinvd,
            Op::Write(0xC000_0011),
            Op::Wbinvd,
            Op::Read,
            Op::Write(0x8000_0011),
        ]
    );
}

#[test]
fn with_disabled_leaves_disabled_cache_disabled() {
    let mut ctl = CacheController::new(Recorder::new(0xC000_0011));
    unsafe { ctl.with_disabled(|| ()) };

    let rec = ctl.into_inner();
    assert_eq!(rec.cr0, 0xC000_0011);
    assert!(rec.ops.iter().all(|op| !matches!(op, Op::Write(v) if v & CD == 0)));
}
