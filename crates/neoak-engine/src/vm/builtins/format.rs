//! Java text formatting: `Double.toString` and `String.format` / `printf`.

use crate::vm::value::Value;

/// `Double.toString`: plain decimal in `[1e-3, 1e7)`, computerized
/// scientific notation (`1.0E7`) outside it, always with a fraction digit.
pub fn double_to_string(d: f64) -> String {
    if d.is_nan() {
        return "NaN".to_string();
    }
    if d.is_infinite() {
        return if d > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if d == 0.0 {
        return if d.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }
    let magnitude = d.abs();
    if (1e-3..1e7).contains(&magnitude) {
        let text = format!("{}", d);
        if text.contains('.') {
            text
        } else {
            format!("{}.0", text)
        }
    } else {
        let text = format!("{:e}", d);
        let (mantissa, exponent) = text.split_once('e').unwrap_or((&text, "0"));
        let mantissa = if mantissa.contains('.') {
            mantissa.to_string()
        } else {
            format!("{}.0", mantissa)
        };
        format!("{}E{}", mantissa, exponent)
    }
}

/// Fraction digits past which every finite `f64` expands to zeros (the
/// smallest subnormal has 1074). `format!` rejects precisions above 65535.
const EXACT_DIGITS: usize = 1100;

/// Fixed-point rendering with `precision` fraction digits, rounding half up
/// on the decimal expansion like `java.util.Formatter`.
pub fn format_fixed(v: f64, precision: usize) -> String {
    if !v.is_finite() {
        return double_to_string(v);
    }
    if precision > EXACT_DIGITS {
        let mut out = format_fixed(v, EXACT_DIGITS);
        out.extend(std::iter::repeat('0').take(precision - EXACT_DIGITS));
        return out;
    }
    let negative = v.is_sign_negative() && v != 0.0;
    let wide = format!("{:.*}", precision + 20, v.abs());
    let (int_part, frac_part) = wide.split_once('.').unwrap_or((&wide, ""));
    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().take(precision))
        .map(|b| b - b'0')
        .collect();
    let round_up = frac_part.as_bytes().get(precision).map_or(false, |b| *b >= b'5');
    if round_up {
        let mut i = digits.len();
        loop {
            if i == 0 {
                digits.insert(0, 1);
                break;
            }
            i -= 1;
            if digits[i] == 9 {
                digits[i] = 0;
            } else {
                digits[i] += 1;
                break;
            }
        }
    }
    let split = digits.len() - precision;
    let mut out = String::new();
    if negative && digits.iter().any(|d| *d != 0) {
        out.push('-');
    }
    out.extend(digits[..split].iter().map(|d| (b'0' + d) as char));
    if precision > 0 {
        out.push('.');
        out.extend(digits[split..].iter().map(|d| (b'0' + d) as char));
    }
    out
}

/// A formatting failure: exception kind and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatError {
    /// Exception class
    pub kind: &'static str,
    /// Exception message
    pub message: String,
}

impl FormatError {
    fn new(kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Default)]
struct Spec {
    index: Option<usize>,
    previous: bool,
    left: bool,
    zero: bool,
    plus: bool,
    space: bool,
    group: bool,
    paren: bool,
    width: Option<usize>,
    precision: Option<usize>,
    conversion: char,
}

/// `String.format`. `texts[i]` is the `toString()` of `args[i]`, computed by
/// the caller because it may run user code.
pub fn format(pattern: &str, args: &[Value], texts: &[String]) -> Result<String, FormatError> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::new();
    let mut next_arg = 0usize;
    let mut last_arg: Option<usize> = None;
    let mut i = 0;
    while i < chars.len() {
        if chars[i] != '%' {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        let start = i;
        let spec = parse_spec(&chars, &mut i)?;
        let source: String = chars[start..i].iter().collect();
        match spec.conversion {
            'n' => {
                out.push('\n');
                continue;
            }
            '%' => {
                out.push_str(&pad("%", &spec));
                continue;
            }
            _ => {}
        }
        let index = if spec.previous {
            last_arg.ok_or_else(|| {
                FormatError::new("MissingFormatArgumentException", format!("Format specifier '{}'", source))
            })?
        } else if let Some(explicit) = spec.index {
            explicit.saturating_sub(1)
        } else {
            next_arg += 1;
            next_arg - 1
        };
        let (Some(arg), Some(text)) = (args.get(index), texts.get(index)) else {
            return Err(FormatError::new(
                "MissingFormatArgumentException",
                format!("Format specifier '{}'", source),
            ));
        };
        last_arg = Some(index);
        out.push_str(&convert(&spec, arg, text)?);
    }
    Ok(out)
}

fn parse_spec(chars: &[char], i: &mut usize) -> Result<Spec, FormatError> {
    let mut spec = Spec::default();
    *i += 1;
    // argument index: digits followed by '$'
    let digits_start = *i;
    while *i < chars.len() && chars[*i].is_ascii_digit() {
        *i += 1;
    }
    if *i < chars.len() && chars[*i] == '$' && *i > digits_start {
        let n: String = chars[digits_start..*i].iter().collect();
        spec.index = n.parse().ok();
        *i += 1;
    } else {
        *i = digits_start;
    }
    while *i < chars.len() {
        match chars[*i] {
            '-' => spec.left = true,
            '0' => spec.zero = true,
            '+' => spec.plus = true,
            ' ' => spec.space = true,
            ',' => spec.group = true,
            '(' => spec.paren = true,
            '#' => {}
            '<' => spec.previous = true,
            _ => break,
        }
        *i += 1;
    }
    let width_start = *i;
    while *i < chars.len() && chars[*i].is_ascii_digit() {
        *i += 1;
    }
    if *i > width_start {
        let n: String = chars[width_start..*i].iter().collect();
        spec.width = n.parse().ok();
    }
    if *i < chars.len() && chars[*i] == '.' {
        *i += 1;
        let precision_start = *i;
        while *i < chars.len() && chars[*i].is_ascii_digit() {
            *i += 1;
        }
        let n: String = chars[precision_start..*i].iter().collect();
        spec.precision = n.parse().ok();
    }
    match chars.get(*i) {
        Some(c) => {
            spec.conversion = *c;
            *i += 1;
            Ok(spec)
        }
        None => Err(FormatError::new("UnknownFormatConversionException", "Conversion = '%'")),
    }
}

fn mismatch(conversion: char, arg: &Value) -> FormatError {
    let class = match arg {
        Value::Str(_) => "java.lang.String".to_string(),
        Value::Bool(_) => "java.lang.Boolean".to_string(),
        Value::Int(_) => "java.lang.Integer".to_string(),
        Value::Double(_) => "java.lang.Double".to_string(),
        Value::Char(_) => "java.lang.Character".to_string(),
        other => other.class_name().to_string(),
    };
    FormatError::new(
        "IllegalFormatConversionException",
        format!("{} != {}", conversion, class),
    )
}

fn convert(spec: &Spec, arg: &Value, text: &str) -> Result<String, FormatError> {
    let body = match spec.conversion {
        's' | 'S' => {
            let mut s = text.to_string();
            if let Some(p) = spec.precision {
                s = s.chars().take(p).collect();
            }
            if spec.conversion == 'S' {
                s = s.to_uppercase();
            }
            s
        }
        'b' | 'B' => {
            let b = match arg {
                Value::Null => false,
                Value::Bool(b) => *b,
                _ => true,
            };
            b.to_string()
        }
        'c' => match arg {
            Value::Null => "null".to_string(),
            Value::Char(c) => c.to_string(),
            Value::Int(code) => char::from_u32(*code as u32).unwrap_or('\u{FFFD}').to_string(),
            other => return Err(mismatch('c', other)),
        },
        'd' => match arg {
            Value::Null => "null".to_string(),
            Value::Int(v) => signed(spec, *v < 0, &group(spec, &v.unsigned_abs().to_string())),
            other => return Err(mismatch('d', other)),
        },
        'x' | 'X' | 'o' => match arg {
            Value::Null => "null".to_string(),
            Value::Int(v) => {
                let bits = if *v >= i32::MIN as i64 && *v <= i32::MAX as i64 {
                    *v as i32 as u32 as u64
                } else {
                    *v as u64
                };
                match spec.conversion {
                    'x' => format!("{:x}", bits),
                    'X' => format!("{:X}", bits),
                    _ => format!("{:o}", bits),
                }
            }
            other => return Err(mismatch(spec.conversion, other)),
        },
        'f' | 'e' | 'E' => match arg {
            Value::Null => "null".to_string(),
            Value::Int(_) | Value::Double(_) => {
                let v = arg.as_double().unwrap_or(0.0);
                if !v.is_finite() {
                    double_to_string(v)
                } else {
                    let precision = spec.precision.unwrap_or(6);
                    let magnitude = match spec.conversion {
                        'f' => group(spec, &format_fixed(v.abs(), precision)),
                        _ => scientific(v.abs(), precision, spec.conversion == 'E'),
                    };
                    signed(spec, v.is_sign_negative() && v != 0.0, &magnitude)
                }
            }
            other => return Err(mismatch(spec.conversion, other)),
        },
        other => {
            return Err(FormatError::new(
                "UnknownFormatConversionException",
                format!("Conversion = '{}'", other),
            ))
        }
    };
    Ok(pad(&body, spec))
}

fn scientific(v: f64, precision: usize, upper: bool) -> String {
    let text = format!("{:.*e}", precision.min(EXACT_DIGITS), v);
    let (mantissa, exponent) = text.split_once('e').unwrap_or((&text, "0"));
    let exp: i32 = exponent.parse().unwrap_or(0);
    let sign = if exp < 0 { '-' } else { '+' };
    let zeros = "0".repeat(precision.saturating_sub(EXACT_DIGITS));
    let out = format!("{}{}e{}{:02}", mantissa, zeros, sign, exp.abs());
    if upper {
        out.to_uppercase()
    } else {
        out
    }
}

fn group(spec: &Spec, digits: &str) -> String {
    if !spec.group {
        return digits.to_string();
    }
    let (int_part, frac) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };
    let mut grouped = String::new();
    for (n, c) in int_part.chars().enumerate() {
        if n > 0 && (int_part.len() - n) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    match frac {
        Some(f) => format!("{}.{}", grouped, f),
        None => grouped,
    }
}

fn signed(spec: &Spec, negative: bool, magnitude: &str) -> String {
    let (prefix, suffix) = if negative {
        if spec.paren {
            ("(", ")")
        } else {
            ("-", "")
        }
    } else if spec.plus {
        ("+", "")
    } else if spec.space {
        (" ", "")
    } else {
        ("", "")
    };
    match spec.width {
        Some(width) if spec.zero && !spec.left => {
            let used = prefix.len() + suffix.len() + magnitude.chars().count();
            let zeros = "0".repeat(width.saturating_sub(used));
            format!("{}{}{}{}", prefix, zeros, magnitude, suffix)
        }
        _ => format!("{}{}{}", prefix, magnitude, suffix),
    }
}

fn pad(body: &str, spec: &Spec) -> String {
    let len = body.chars().count();
    match spec.width {
        Some(width) if width > len => {
            let fill = " ".repeat(width - len);
            if spec.left {
                format!("{}{}", body, fill)
            } else {
                format!("{}{}", fill, body)
            }
        }
        _ => body.to_string(),
    }
}
