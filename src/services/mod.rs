pub mod cancellation;
pub mod po_lifecycle;
pub mod po_totals;
pub mod procurement;
pub mod receiving;
