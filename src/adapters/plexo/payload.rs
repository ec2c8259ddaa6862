//! Request objects for the express checkout gateway.
//!
//! Field construction order is irrelevant: everything here is canonicalized
//! before signing. Amounts are `Money`, so they always carry a fraction.

use serde::Serialize;
use serde_json::Value;

use crate::config::GatewayConfig;
use crate::domain::checkout::{Money, Transaction};
use crate::domain::foundation::TransactionId;

/// `AuthorizationData.Action` for an express checkout purchase.
const PURCHASE_ACTION: i32 = 64;
/// `AuthorizationData.Type` for a purchase authorization.
const AUTHORIZATION_TYPE: i32 = 0;
/// `FinancialInclusion.Type` used by the merchant.
const FINANCIAL_INCLUSION_TYPE: i32 = 1;
/// Request type discriminator for a status inquiry.
const STATUS_INQUIRY_TYPE: i32 = 1;

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct AuthorizationRequest<'a> {
    client: &'a str,
    request: AuthorizationBody<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct AuthorizationBody<'a> {
    authorization_data: AuthorizationData<'a>,
    payment_data: PaymentData<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct AuthorizationData<'a> {
    action: i32,
    client_information: ClientInformation<'a>,
    do_not_use_callback: bool,
    limit_banks: Vec<String>,
    limit_issuers: Vec<String>,
    meta_reference: &'a str,
    optional_commerce_id: i64,
    redirect_uri: &'a str,
    #[serde(rename = "Type")]
    kind: i32,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ClientInformation<'a> {
    name: &'a str,
    last_name: &'a str,
    address: &'a str,
    email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct PaymentData<'a> {
    client_reference_id: String,
    currency_id: i32,
    financial_inclusion: FinancialInclusion,
    installments: i32,
    items: Vec<Item<'a>>,
    optional_commerce_id: i64,
    payment_instrument_input: PaymentInstrumentInput<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct FinancialInclusion {
    billed_amount: Money,
    invoice_number: i64,
    taxed_amount: Money,
    #[serde(rename = "Type")]
    kind: i32,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Item<'a> {
    amount: Money,
    client_item_reference_id: String,
    name: &'a str,
    quantity: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct PaymentInstrumentInput<'a> {
    optional_instrument_fields: ShippingFields<'a>,
    use_extended_client_credit_if_available: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ShippingFields<'a> {
    shipping_address: &'a str,
    shipping_zip_code: &'a str,
    shipping_city: &'a str,
    shipping_country: &'a str,
    shipping_first_name: &'a str,
    shipping_last_name: &'a str,
    shipping_phone_number: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct StatusInquiry {
    client_reference_id: String,
    #[serde(rename = "Type")]
    kind: i32,
}

/// Builds the inner `Object` of each gateway request.
#[derive(Debug, Clone)]
pub struct PayloadBuilder {
    config: GatewayConfig,
}

impl PayloadBuilder {
    pub fn new(config: GatewayConfig) -> Self {
        Self { config }
    }

    /// Purchase authorization for `transaction`.
    ///
    /// `BilledAmount` is the sum of item amounts; `TaxedAmount` is the
    /// configured share of it.
    pub fn authorization(&self, transaction: &Transaction) -> Result<Value, serde_json::Error> {
        let customer = &transaction.customer;
        let shipping = customer.shipping();

        let items: Vec<Item<'_>> = transaction
            .line_items
            .iter()
            .map(|line| Item {
                amount: line.amount(),
                client_item_reference_id: line.product_id().item_reference(),
                name: line.name(),
                quantity: line.quantity(),
            })
            .collect();
        let billed: Money = items.iter().map(|item| item.amount).sum();

        let request = AuthorizationRequest {
            client: &self.config.client_name,
            request: AuthorizationBody {
                authorization_data: AuthorizationData {
                    action: PURCHASE_ACTION,
                    client_information: ClientInformation {
                        name: customer.first_name(),
                        last_name: customer.last_name(),
                        address: &shipping.address,
                        email: customer.email(),
                    },
                    do_not_use_callback: !self.config.use_callback,
                    limit_banks: self.config.limit_banks_list(),
                    limit_issuers: self.config.limit_issuers_list(),
                    meta_reference: customer.email(),
                    optional_commerce_id: self.config.commerce_id,
                    redirect_uri: &self.config.redirect_uri,
                    kind: AUTHORIZATION_TYPE,
                },
                payment_data: PaymentData {
                    client_reference_id: transaction.id.to_string(),
                    currency_id: self.config.currency_id,
                    financial_inclusion: FinancialInclusion {
                        billed_amount: billed,
                        invoice_number: self.config.invoice_number,
                        taxed_amount: billed.percent(self.config.taxed_ratio_percent),
                        kind: FINANCIAL_INCLUSION_TYPE,
                    },
                    installments: 1,
                    items,
                    optional_commerce_id: self.config.commerce_id,
                    payment_instrument_input: PaymentInstrumentInput {
                        optional_instrument_fields: ShippingFields {
                            shipping_address: &shipping.address,
                            shipping_zip_code: &shipping.zip_code,
                            shipping_city: &shipping.city,
                            shipping_country: &self.config.shipping_country,
                            shipping_first_name: customer.first_name(),
                            shipping_last_name: customer.last_name(),
                            shipping_phone_number: customer.phone(),
                        },
                        use_extended_client_credit_if_available: false,
                    },
                },
            },
        };

        serde_json::to_value(request)
    }

    /// Status inquiry: only the correlation reference and the type.
    pub fn status_inquiry(&self, id: &TransactionId) -> Result<Value, serde_json::Error> {
        serde_json::to_value(StatusInquiry {
            client_reference_id: id.to_string(),
            kind: STATUS_INQUIRY_TYPE,
        })
    }
}
