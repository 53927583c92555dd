use std::sync::atomic::{AtomicUsize, Ordering};

use log::trace;

use crate::expression::Literal;

/// Prefix reserved for generated literals. User-facing names may not start with it.
pub const RESERVED_PREFIX: char = '_';

/// Hands out fresh internal literal names `_x0`, `_x1`, ...
///
/// Every authority owns its own counter, so transformations bound to separate
/// authorities never observe each other. Names are only unique *within* one
/// authority: literals from two different authorities can coincide, which is
/// fine as long as their formulas are never mixed. For simple use there is a
/// process-wide [`NamingAuthority::global`].
#[derive(Debug, Default)]
pub struct NamingAuthority {
    next: AtomicUsize,
}

static GLOBAL: NamingAuthority = NamingAuthority::new();

impl NamingAuthority {
    pub const fn new() -> Self {
        Self { next: AtomicUsize::new(0) }
    }

    pub fn global() -> &'static NamingAuthority {
        &GLOBAL
    }

    /// Allocates the next serial number and wraps it into a reserved-name literal.
    pub fn fresh(&self) -> Literal {
        let serial = self.next.fetch_add(1, Ordering::Relaxed);
        let literal = Literal::internal(format!("{RESERVED_PREFIX}x{serial}"));
        trace!("fresh witness {}", literal);
        literal
    }

    /// Number of names handed out so far.
    pub fn issued(&self) -> usize {
        self.next.load(Ordering::Relaxed)
    }
}
