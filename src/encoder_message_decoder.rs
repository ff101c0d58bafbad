//! Decoder for the lines the arm's microcontroller prints over serial.
//!
//! Each reading arrives on its own line, with the two joint angles in
//! degrees separated by a tab:
//!
//! ```text
//! Encoder 1: 12.50\tEncoder 2: -3.75
//! ```
//!
//! Anything the device printed before `Encoder 1` on the same line is
//! ignored.

use nom::{
    bytes::complete::{tag, take_until, take_while},
    character::complete::char,
    combinator::{all_consuming, map},
    error::Error,
    number::complete::double,
    sequence::{delimited, preceded, separated_pair},
    Finish, IResult,
};

use std::str::FromStr;

/// One pair of encoder angles, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncoderReading {
    /// Angle reported by encoder 1
    pub encoder_1_deg: f64,
    /// Angle reported by encoder 2
    pub encoder_2_deg: f64,
}

// Only spaces; a tab separates the two readings.
fn spaces(s: &str) -> IResult<&str, &str> {
    take_while(|c| c == ' ')(s)
}

fn parse_labelled_angle<'a>(label: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, f64> {
    preceded(
        tag(label),
        preceded(char(':'), delimited(spaces, double, spaces)),
    )
}

fn parse_encoder_line(s: &str) -> IResult<&str, EncoderReading> {
    map(
        all_consuming(preceded(
            take_until("Encoder 1"),
            separated_pair(
                parse_labelled_angle("Encoder 1"),
                char('\t'),
                parse_labelled_angle("Encoder 2"),
            ),
        )),
        |(encoder_1_deg, encoder_2_deg)| EncoderReading {
            encoder_1_deg,
            encoder_2_deg,
        },
    )(s)
}

impl FromStr for EncoderReading {
    type Err = Error<String>;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match parse_encoder_line(s.trim()).finish() {
            Ok((_remaining, reading)) => Ok(reading),
            Err(Error { input, code }) => Err(Error {
                input: input.to_string(),
                code,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_angles() {
        let s = "Encoder 1: 12.50\tEncoder 2: 47.25";

        let (leftover, res) = parse_encoder_line(s).unwrap();

        assert_eq!(leftover, "");
        assert_eq!(
            res,
            EncoderReading {
                encoder_1_deg: 12.5,
                encoder_2_deg: 47.25,
            }
        );
    }

    #[test]
    fn test_integer_and_negative_angles() {
        let res: EncoderReading = "Encoder 1: -90\tEncoder 2: 180".parse().unwrap();
        assert_eq!(
            res,
            EncoderReading {
                encoder_1_deg: -90.0,
                encoder_2_deg: 180.0,
            }
        );
    }

    #[test]
    fn test_line_ending_is_trimmed() {
        let res: EncoderReading = "Encoder 1: 1.0\tEncoder 2: 2.0\r\n".parse().unwrap();
        assert_eq!(res.encoder_1_deg, 1.0);
        assert_eq!(res.encoder_2_deg, 2.0);
    }

    #[test]
    fn test_noise_before_first_label_is_skipped() {
        let res: EncoderReading = "\u{0}\u{7f}ok Encoder 1: 5\tEncoder 2: 6".parse().unwrap();
        assert_eq!(
            res,
            EncoderReading {
                encoder_1_deg: 5.0,
                encoder_2_deg: 6.0,
            }
        );
        assert!("noise Encoder 2: 6".parse::<EncoderReading>().is_err());
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!("".parse::<EncoderReading>().is_err());
        assert!("Encoder 1: 12.5".parse::<EncoderReading>().is_err());
        assert!("Encoder 1: abc\tEncoder 2: 1".parse::<EncoderReading>().is_err());
        assert!("Encoder 1: 1 Encoder 2: 2".parse::<EncoderReading>().is_err());
        assert!("Encoder 1: 1\tEncoder 2: 2 extra".parse::<EncoderReading>().is_err());
    }
}
