//! Message trait for action inputs.

/// A marker trait for values that flow into an action.
///
/// Messages must be `Send + Sync + 'static` so that an action can suspend
/// between steps and resume on another thread. Every such type is a
/// `Message`; the trait exists to give a readable diagnostic when the bound
/// is not met.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone, Debug)]
/// struct CreateOrder { sku: String, quantity: u32 }
///
/// // CreateOrder is a Message automatically.
/// let action = ActionBuilder::<CreateOrder, OrderId>::new().handler(place_order);
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid Message",
    label = "must be `Send + Sync + 'static`",
    note = "Action inputs must be thread-safe and static."
)]
pub trait Message: Send + Sync + 'static {}

impl<T: Send + Sync + 'static> Message for T {}
