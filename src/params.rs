use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::{NewAgent, Order};
use crate::error::{ErrorKind, TradeError};

//Body of POST /quote and POST /trade. Amount is PROMPT to spend for a buy,
//tokens to sell for a sell. Amounts may be JSON strings or numbers.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TradeRequest {
    pub agent_id: String,
    pub side: String,
    pub amount: Value,
    #[serde(default)]
    pub min_out: Option<Value>,
}

impl TradeRequest {
    /// Turns the loosely typed body into a strict `Order`.
    pub fn into_order(self) -> Result<(String, Order), TradeError> {
        let amount = parse_amount(&self.amount, "amount")?;
        let min_out = match &self.min_out {
            None | Some(Value::Null) => None,
            Some(value) => Some(parse_amount(value, "minOut")?),
        };

        let order = match self.side.trim().to_ascii_lowercase().as_str() {
            "buy" => Order::Buy { spend: amount, min_quantity: min_out },
            "sell" => Order::Sell { quantity: amount, min_proceeds: min_out },
            other => {
                return Err(TradeError::InvalidRequest(format!(
                    "side must be \"buy\" or \"sell\", got {:?}",
                    other
                )))
            }
        };

        Ok((self.agent_id, order))
    }
}

fn parse_amount(value: &Value, field: &str) -> Result<Decimal, TradeError> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        other => {
            return Err(TradeError::InvalidAmount(format!(
                "{} must be a number or numeric string, got {}",
                field, other
            )))
        }
    };

    Decimal::from_str_exact(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| TradeError::InvalidAmount(format!("{} {:?} is not a finite decimal", field, text)))
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateAgentRequest {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub creator: String,
}

impl From<CreateAgentRequest> for NewAgent {
    fn from(request: CreateAgentRequest) -> Self {
        NewAgent {
            id: request.id,
            name: request.name,
            symbol: request.symbol,
            creator: request.creator,
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub kind: ErrorKind,
    pub code: String,
    pub message: String,
}

impl From<&TradeError> for ErrorResponse {
    fn from(err: &TradeError) -> Self {
        ErrorResponse {
            kind: err.kind(),
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}
