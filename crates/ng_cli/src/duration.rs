use std::str::FromStr;
use std::time::Duration;

/// A duration written the way people type it: `10s`, `1m30s`, `500ms`.
/// A bare number is seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumanDuration(pub Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("Duration must include a number".to_string());
        }

        let mut total = Duration::ZERO;
        let mut rest = s;
        while !rest.is_empty() {
            let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
            if digits == 0 {
                return Err(format!("Invalid duration: {}", s));
            }
            let number: u64 = rest[..digits]
                .parse()
                .map_err(|_| format!("Invalid number in duration: {}", s))?;
            rest = &rest[digits..];

            let unit_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
            let unit = &rest[..unit_len];
            rest = &rest[unit_len..];

            total += match unit {
                "ms" => Duration::from_millis(number),
                "" | "s" => Duration::from_secs(number),
                "m" => Duration::from_secs(number * 60),
                "h" => Duration::from_secs(number * 3600),
                other => return Err(format!("Invalid duration unit: {}", other)),
            };
        }

        Ok(HumanDuration(total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_durations() {
        assert_eq!("10s".parse::<HumanDuration>(), Ok(HumanDuration(Duration::from_secs(10))));
        assert_eq!("15".parse::<HumanDuration>(), Ok(HumanDuration(Duration::from_secs(15))));
        assert_eq!("1m30s".parse::<HumanDuration>(), Ok(HumanDuration(Duration::from_secs(90))));
        assert_eq!("500ms".parse::<HumanDuration>(), Ok(HumanDuration(Duration::from_millis(500))));
    }

    #[test]
    fn test_reject_bad_durations() {
        assert!("".parse::<HumanDuration>().is_err());
        assert!("s".parse::<HumanDuration>().is_err());
        assert!("10d".parse::<HumanDuration>().is_err());
        assert!("1 m".parse::<HumanDuration>().is_err());
    }
}
