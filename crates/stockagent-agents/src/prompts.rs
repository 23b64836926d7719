/// System instruction sent with every recommendation request.
pub const ANALYST_SYSTEM_PROMPT: &str = "You are a financial analyst.";

/// User message asking for a decision on `ticker` at `price`.
///
/// The price is always rendered with two decimals. The two-line answer format
/// is requested, not enforced.
pub fn analysis_user_prompt(ticker: &str, price: f64) -> String {
    format!(
        "Analyze the stock {ticker} with the current price of ${price:.2}. \
         Based on market trends and the price provided, please provide your final decision \
         in the following format:\n\n\
         Decision: [BUY/HOLD/SELL]\n\
         Explanation: [Your detailed reasoning]."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_ticker_and_two_decimal_price() {
        let prompt = analysis_user_prompt("NVDA", 120.5);
        assert!(prompt.contains("NVDA"));
        assert!(prompt.contains("$120.50"));
        assert!(prompt.contains("Decision: [BUY/HOLD/SELL]\nExplanation:"));
    }

    #[test]
    fn price_is_rounded_not_truncated() {
        assert!(analysis_user_prompt("X", 9.999).contains("$10.00"));
        assert!(analysis_user_prompt("X", 0.125_1).contains("$0.13"));
    }

    #[test]
    fn ticker_case_is_preserved() {
        assert!(analysis_user_prompt("brk-b", 1.0).contains("brk-b"));
    }
}
