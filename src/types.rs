//! Core identifier, price, and quantity types shared across the crate.
//!
//! Every id type carries a `NIL_*` sentinel (the maximum value of the
//! underlying integer) used for default-constructed queue slots and for
//! message fields that do not apply, e.g. the order id of a trade print.

/// Client-assigned order identifier, unique per client and instrument while
/// the order is live. Also the type of engine-assigned market order ids,
/// which are unique forever within one instrument's book.
pub type OrderId = u64;
pub const NIL_ORDER_ID: OrderId = OrderId::MAX;

/// Trading client identifier, assigned by the gateway.
pub type ClientId = u32;
pub const NIL_CLIENT_ID: ClientId = ClientId::MAX;

/// Instrument identifier; one order book exists per instrument.
pub type InstrumentId = u8;
pub const NIL_INSTRUMENT_ID: InstrumentId = InstrumentId::MAX;

/// Fixed-point price. The venue owns the scaling factor; the core only
/// compares and echoes prices.
pub type Price = i64;
pub const NIL_PRICE: Price = Price::MAX;

/// Order quantity (leaves quantity once resting).
pub type Qty = u32;
pub const NIL_QTY: Qty = Qty::MAX;

/// Arrival sequence within a price level; establishes FIFO time priority.
pub type Priority = u64;
pub const NIL_PRIORITY: Priority = Priority::MAX;

/// Order side.
///
/// `Invalid` is the default so queue slots and rejection responses have a
/// well-defined placeholder value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Side {
    #[default]
    Invalid = 0,
    Buy = 1,
    Sell = 2,
}

impl Side {
    /// The side an incoming order matches against.
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
            Side::Invalid => Side::Invalid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_opposite() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
        assert_eq!(Side::Invalid.opposite(), Side::Invalid);
    }

    #[test]
    fn side_default_is_invalid() {
        assert_eq!(Side::default(), Side::Invalid);
    }
}
