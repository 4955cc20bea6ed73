use stripe::{
    Client, CreateCustomer, CreateSetupIntent, Customer, CustomerId, ListPaymentMethods,
    PaymentMethod, PaymentMethodTypeFilter, SetupIntent,
};

use crate::error::{AppError, Res};

pub fn create_client(secret_key: &str) -> Client {
    Client::new(secret_key)
}

/// Creates a new Stripe customer profile for a client.
pub async fn create_customer(
    client: &Client,
    name: &str,
    email: Option<&str>,
    phone: &str,
) -> Res<Customer> {
    let params = CreateCustomer {
        email,
        name: Some(name),
        phone: Some(phone),
        ..Default::default()
    };

    Customer::create(client, params)
        .await
        .map_err(AppError::from)
}

/// Retrieve customer object based on customer ID.
pub async fn get_customer(client: &Client, customer_id: &str) -> Res<Customer> {
    let id = parse_customer_id(customer_id)?;
    Customer::retrieve(client, &id, &[])
        .await
        .map_err(AppError::from)
}

/// Creates a deferred authorization ("setup") for a customer so a card
/// can be stored without charging it. The returned object carries a
/// `client_secret` the frontend uses to complete the setup.
pub async fn create_setup_intent(client: &Client, customer_id: &str) -> Res<SetupIntent> {
    let id = parse_customer_id(customer_id)?;
    let params = CreateSetupIntent {
        customer: Some(id),
        ..Default::default()
    };

    SetupIntent::create(client, params)
        .await
        .map_err(AppError::from)
}

/// Lists the card payment methods stored on a customer profile.
pub async fn list_card_payment_methods(
    client: &Client,
    customer_id: &str,
) -> Res<Vec<PaymentMethod>> {
    let id = parse_customer_id(customer_id)?;
    let params = ListPaymentMethods {
        customer: Some(id),
        type_: Some(PaymentMethodTypeFilter::Card),
        ..Default::default()
    };

    let methods = PaymentMethod::list(client, &params)
        .await
        .map_err(AppError::from)?;
    Ok(methods.data)
}

/// The customer's default payment method id, when one is set.
pub fn default_payment_method_id(customer: &Customer) -> Option<String> {
    customer
        .invoice_settings
        .as_ref()
        .and_then(|settings| settings.default_payment_method.as_ref())
        .map(|pm| pm.id().to_string())
}

fn parse_customer_id(customer_id: &str) -> Res<CustomerId> {
    customer_id.parse::<CustomerId>().map_err(|e| {
        AppError::Internal(format!(
            "Failed to parse customer id: {}. {}",
            customer_id, e
        ))
    })
}
