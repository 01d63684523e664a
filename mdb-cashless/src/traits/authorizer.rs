//! Vend authorization collaborator

/// An item the VMC wants to dispense
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VendRequest {
    /// Item price in scaled units
    pub price: u16,
    /// VMC item number
    pub item: u16,
}

/// Decision on a vend request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Authorization {
    /// Charge `amount` and let the VMC dispense
    Approved { amount: u16 },
    /// Refuse the vend
    Denied,
    /// Decision comes later through `ReaderContext::complete_authorization`
    Deferred,
}

/// Payment backend the reader hands vend traffic to
///
/// Called synchronously from the VEND handler, so implementations must not
/// block. A backend that needs a network round trip returns
/// [`Authorization::Deferred`] and posts the result when it arrives; the
/// VMC keeps polling in the meantime.
pub trait VendAuthorizer {
    /// Decide whether the vend may go ahead
    fn authorize(&mut self, request: &VendRequest) -> Authorization;

    /// The VMC dispensed `item`
    fn vend_succeeded(&mut self, _item: u16) {}

    /// The VMC could not dispense; refund `request`
    fn vend_failed(&mut self, _request: &VendRequest) {}

    /// A cash purchase happened on the VMC
    fn cash_sale(&mut self, _sale: &VendRequest) {}
}

impl<A: VendAuthorizer + ?Sized> VendAuthorizer for &mut A {
    fn authorize(&mut self, request: &VendRequest) -> Authorization {
        (**self).authorize(request)
    }

    fn vend_succeeded(&mut self, item: u16) {
        (**self).vend_succeeded(item)
    }

    fn vend_failed(&mut self, request: &VendRequest) {
        (**self).vend_failed(request)
    }

    fn cash_sale(&mut self, sale: &VendRequest) {
        (**self).cash_sale(sale)
    }
}

/// Refuses every vend; the reader never settles a payment
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAll;

impl VendAuthorizer for DenyAll {
    fn authorize(&mut self, _request: &VendRequest) -> Authorization {
        Authorization::Denied
    }
}

/// Approves every vend at the requested price (free-vend / test mode)
#[derive(Debug, Clone, Copy, Default)]
pub struct FreeVend;

impl VendAuthorizer for FreeVend {
    fn authorize(&mut self, request: &VendRequest) -> Authorization {
        Authorization::Approved {
            amount: request.price,
        }
    }
}
