use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, TimeDelta, TimeZone, Utc};

use super::{
	BytesFormat, ConvertErrorKind, ConvertOptions, Converter, DurationOptions, DurationUnit, InstantOptions, Partial, Target, TypeRegistry, TypeShape, convert,
	encode_instant_binary,
};
use crate::pick::{Array, Foreign, ForeignValue, KeyedMap, MapKey, Primitive, PrimitiveKind, Record, Value};

fn converter() -> Converter {
	Converter::default()
}

fn to(value: Value, kind: PrimitiveKind) -> Primitive {
	converter().convert(&value, kind).expect("conversion succeeds")
}

fn fails(value: Value, kind: PrimitiveKind) -> super::ConvertError {
	converter().convert(&value, kind).expect_err("conversion fails")
}

#[test]
fn identity_for_every_primitive() {
	let samples = [
		Value::Bool(true),
		Value::I8(-8),
		Value::I16(-16),
		Value::I32(-32),
		Value::I64(-64),
		Value::Isize(-1),
		Value::U8(8),
		Value::U16(16),
		Value::U32(32),
		Value::U64(64),
		Value::Usize(1),
		Value::F32(1.5),
		Value::F64(-2.25),
		Value::from("text"),
	];
	for sample in samples {
		let kind = PrimitiveKind::ALL
			.into_iter()
			.find(|kind| kind.name() == sample.type_name())
			.expect("kind for sample");
		assert_eq!(Value::from(to(sample.clone(), kind)), sample);
	}
}

#[test]
fn null_converts_to_zero() {
	for kind in PrimitiveKind::ALL {
		assert_eq!(to(Value::Null, kind), Primitive::zero(kind), "zero of {kind}");
	}
	assert_eq!(convert::<DateTime<Utc>>(&Value::Null).expect("instant"), DateTime::<Utc>::UNIX_EPOCH);
	assert_eq!(convert::<TimeDelta>(&Value::Null).expect("duration"), TimeDelta::zero());
	assert!(converter().convert_sequence(&Value::Null, PrimitiveKind::I32).expect("sequence").is_empty());
}

#[test]
fn max_i64_into_i32_overflows_to_low_bits() {
	let err = fails(Value::I64(i64::MAX), PrimitiveKind::I32);
	assert_eq!(err.kind, ConvertErrorKind::Overflow);
	assert_eq!(err.partial, Some(Partial::Primitive(Primitive::I32(-1))));
	assert_eq!(err.value, Value::I64(i64::MAX));
	assert_eq!(err.value_type, "i64");
}

#[test]
fn integer_narrowing_truncates_bits() {
	let err = fails(Value::I32(300), PrimitiveKind::U8);
	assert_eq!(err.partial, Some(Partial::Primitive(Primitive::U8(44))));

	let err = fails(Value::I8(-1), PrimitiveKind::U64);
	assert_eq!(err.partial, Some(Partial::Primitive(Primitive::U64(u64::MAX))));

	let err = fails(Value::U64(u64::MAX), PrimitiveKind::I64);
	assert_eq!(err.partial, Some(Partial::Primitive(Primitive::I64(-1))));

	assert_eq!(to(Value::U64(127), PrimitiveKind::I8), Primitive::I8(127));
	assert_eq!(to(Value::I64(-128), PrimitiveKind::I8), Primitive::I8(-128));
}

#[test]
fn platform_integers_use_pointer_width() {
	let wide = Value::I64(i64::from(i32::MAX) + 1);
	let result = converter().convert(&wide, PrimitiveKind::Isize);
	if cfg!(target_pointer_width = "64") {
		assert_eq!(result.expect("fits isize"), Primitive::Isize((i64::from(i32::MAX) + 1) as isize));
	} else {
		assert!(result.expect_err("exceeds isize").is_overflow());
	}
	assert!(fails(Value::I8(-1), PrimitiveKind::Usize).is_overflow());
}

#[test]
fn float_to_int_loses_decimals() {
	let err = fails(Value::F64(2.12), PrimitiveKind::I64);
	assert_eq!(err.kind, ConvertErrorKind::LostDecimals);
	assert_eq!(err.partial, Some(Partial::Primitive(Primitive::I64(2))));

	let err = fails(Value::F64(-7.9), PrimitiveKind::I16);
	assert_eq!(err.partial, Some(Partial::Primitive(Primitive::I16(-7))));

	assert_eq!(to(Value::F64(42.0), PrimitiveKind::U32), Primitive::U32(42));
	assert_eq!(to(Value::F32(-3.0), PrimitiveKind::I8), Primitive::I8(-3));
}

#[test]
fn float_to_int_range_checks() {
	assert!(fails(Value::F64(9.3e18), PrimitiveKind::I64).is_overflow());
	assert!(fails(Value::F64(-1.0), PrimitiveKind::U64).is_overflow());
	assert!(fails(Value::F64(f64::INFINITY), PrimitiveKind::I64).is_overflow());
	assert!(fails(Value::F64(1e3), PrimitiveKind::I8).is_overflow());
	assert_eq!(to(Value::F64(-9_223_372_036_854_775_808.0), PrimitiveKind::I64), Primitive::I64(i64::MIN));
	assert!(fails(Value::F64(f64::NAN), PrimitiveKind::I32).is_lost_decimals());
}

#[test]
fn out_of_range_fractions_overflow() {
	let err = fails(Value::F64(300.5), PrimitiveKind::I8);
	assert!(err.is_overflow());
	assert_eq!(err.partial, Some(Partial::Primitive(Primitive::I8(44))));

	let err = fails(Value::from("300.5"), PrimitiveKind::U8);
	assert!(err.is_overflow());
	assert_eq!(err.partial, Some(Partial::Primitive(Primitive::U8(44))));

	assert!(fails(Value::F64(-40000.25), PrimitiveKind::I16).is_overflow());
	assert!(converter().convert_to::<i8>(&Value::F64(300.5)).expect_err("too big").is_overflow());
	assert!(fails(Value::F64(100.5), PrimitiveKind::I8).is_lost_decimals());
}

#[test]
fn f64_to_f32_overflow_is_infinite() {
	let err = fails(Value::F64(1e300), PrimitiveKind::F32);
	assert!(err.is_overflow());
	assert_eq!(err.partial, Some(Partial::Primitive(Primitive::F32(f32::INFINITY))));
	let err = fails(Value::F64(-1e300), PrimitiveKind::F32);
	assert_eq!(err.partial, Some(Partial::Primitive(Primitive::F32(f32::NEG_INFINITY))));

	assert_eq!(to(Value::F64(0.5), PrimitiveKind::F32), Primitive::F32(0.5));
	assert_eq!(to(Value::F32(0.25), PrimitiveKind::F64), Primitive::F64(0.25));
	assert_eq!(to(Value::U64(u64::MAX), PrimitiveKind::F64), Primitive::F64(u64::MAX as f64));
}

#[test]
fn bools_and_numbers() {
	assert_eq!(to(Value::Bool(true), PrimitiveKind::U16), Primitive::U16(1));
	assert_eq!(to(Value::Bool(false), PrimitiveKind::F64), Primitive::F64(0.0));
	assert_eq!(to(Value::I32(-4), PrimitiveKind::Bool), Primitive::Bool(true));
	assert_eq!(to(Value::F64(0.0), PrimitiveKind::Bool), Primitive::Bool(false));
}

#[test]
fn text_to_numbers() {
	assert_eq!(to(Value::from("-12"), PrimitiveKind::I16), Primitive::I16(-12));
	assert_eq!(to(Value::from("4e2"), PrimitiveKind::U16), Primitive::U16(400));
	assert_eq!(to(Value::from("2.5"), PrimitiveKind::F32), Primitive::F32(2.5));

	let err = fails(Value::from("2.5"), PrimitiveKind::I32);
	assert!(err.is_lost_decimals());
	assert_eq!(err.partial, Some(Partial::Primitive(Primitive::I32(2))));

	let err = fails(Value::from("70000"), PrimitiveKind::I16);
	assert!(err.is_overflow());
	assert_eq!(err.partial, Some(Partial::Primitive(Primitive::I16(70000_i32 as i16))));

	assert!(fails(Value::from(""), PrimitiveKind::I32).is_invalid_syntax());
	assert!(fails(Value::from("12abc"), PrimitiveKind::I32).is_invalid_syntax());
	assert!(fails(Value::from("-1"), PrimitiveKind::U8).is_invalid_syntax());
	assert!(fails(Value::from("1e400"), PrimitiveKind::F64).is_overflow());
	assert!(fails(Value::from("abc"), PrimitiveKind::F64).is_invalid_syntax());
}

#[test]
fn text_to_bool() {
	assert_eq!(to(Value::from("T"), PrimitiveKind::Bool), Primitive::Bool(true));
	assert_eq!(to(Value::from("False"), PrimitiveKind::Bool), Primitive::Bool(false));
	assert!(fails(Value::from("yes"), PrimitiveKind::Bool).is_invalid_syntax());
}

#[test]
fn everything_renders_as_text() {
	assert_eq!(to(Value::I64(2), PrimitiveKind::String), Primitive::String("2".to_owned()));
	assert_eq!(to(Value::Bool(true), PrimitiveKind::String), Primitive::String("true".to_owned()));
	assert_eq!(to(Value::F64(2.12), PrimitiveKind::String), Primitive::String("2.12".to_owned()));
	assert_eq!(to(Value::F64(1234567.0), PrimitiveKind::String), Primitive::String("1.2346E+06".to_owned()));
	assert_eq!(to(Value::F32(0.1), PrimitiveKind::String), Primitive::String("0.1".to_owned()));
	assert_eq!(to(Value::RawJson("{\"a\": 1}".to_owned()), PrimitiveKind::String), Primitive::String("{\"a\": 1}".to_owned()));
	assert_eq!(to(Value::Bytes(b"hi".to_vec()), PrimitiveKind::String), Primitive::String("hi".to_owned()));
}

#[test]
fn number_lexemes_behave_as_text() {
	assert_eq!(to(Value::Number("17".to_owned()), PrimitiveKind::U8), Primitive::U8(17));
	assert_eq!(to(Value::Number("1.25".to_owned()), PrimitiveKind::F64), Primitive::F64(1.25));
	assert_eq!(to(Value::Number("1".to_owned()), PrimitiveKind::Bool), Primitive::Bool(true));
	assert_eq!(to(Value::Number("3.50".to_owned()), PrimitiveKind::String), Primitive::String("3.50".to_owned()));
	assert!(fails(Value::Number("1.5".to_owned()), PrimitiveKind::I8).is_lost_decimals());
}

#[test]
fn bytes_parse_as_text() {
	assert_eq!(to(Value::Bytes(b"42".to_vec()), PrimitiveKind::I32), Primitive::I32(42));
	assert_eq!(to(Value::Bytes(b"true".to_vec()), PrimitiveKind::Bool), Primitive::Bool(true));
}

#[test]
fn containers_are_not_scalars() {
	assert!(fails(Value::seq([Value::I32(1)]), PrimitiveKind::I32).is_invalid_type());
	assert!(fails(Value::map([("a", Value::Null)]), PrimitiveKind::String).is_invalid_type());
	assert!(fails(Value::from(Record::new("Point")), PrimitiveKind::I32).is_invalid_type());
}

#[test]
fn error_message_names_value_and_target() {
	let err = fails(Value::I64(i64::MAX), PrimitiveKind::I32);
	assert_eq!(err.to_string(), "cannot convert i64 9223372036854775807 to i32: value out of range");
}

#[test]
fn sequences_convert_element_wise() {
	let conv = converter();
	let seq = Value::seq([Value::I64(1), Value::from("2"), Value::F64(3.0)]);
	assert_eq!(conv.convert_sequence(&seq, PrimitiveKind::U8).expect("bytes"), Array::U8(vec![1, 2, 3]));

	let typed = Value::from(Array::I32(vec![-1, 5]));
	assert_eq!(conv.convert_sequence(&typed, PrimitiveKind::I32).expect("same kind"), Array::I32(vec![-1, 5]));
	assert_eq!(conv.convert_sequence(&typed, PrimitiveKind::String).expect("text"), Array::String(vec!["-1".to_owned(), "5".to_owned()]));

	let single = conv.convert_sequence(&Value::I32(7), PrimitiveKind::I64).expect("scalar");
	assert_eq!(single, Array::I64(vec![7]));
}

#[test]
fn sequence_stops_at_first_bad_element() {
	let seq = Value::seq([Value::I32(1), Value::from("x"), Value::I32(300)]);
	let err = converter().convert_sequence(&seq, PrimitiveKind::U8).expect_err("bad element");
	assert!(err.is_invalid_syntax());
	assert_eq!(err.value, Value::from("x"));
	assert_eq!(err.target, "[u8][1]");
}

#[test]
fn bytes_target_takes_text_bytes() {
	let conv = converter();
	assert_eq!(conv.convert_sequence(&Value::from("hi"), PrimitiveKind::U8).expect("bytes"), Array::U8(b"hi".to_vec()));
	assert_eq!(conv.convert_sequence(&Value::Bytes(vec![0, 255]), PrimitiveKind::U8).expect("bytes"), Array::U8(vec![0, 255]));
	assert_eq!(convert::<Vec<u8>>(&Value::RawJson("[]".to_owned())).expect("raw"), b"[]".to_vec());
}

#[test]
fn bytes_convert_element_wise_into_other_kinds() {
	let conv = converter();
	let bytes = Value::Bytes(vec![1, 2, 3]);
	assert_eq!(conv.convert_sequence(&bytes, PrimitiveKind::I32).expect("ints"), Array::I32(vec![1, 2, 3]));
	assert_eq!(convert::<Vec<String>>(&bytes).expect("text"), vec!["1".to_owned(), "2".to_owned(), "3".to_owned()]);

	let from_bytes: HashMap<usize, u16> = conv.convert_to(&bytes).expect("map");
	assert_eq!(from_bytes, HashMap::from([(0, 1), (1, 2), (2, 3)]));

	let err = conv.convert_sequence(&Value::Bytes(vec![1, 200]), PrimitiveKind::I8).expect_err("overflow");
	assert!(err.is_overflow());
	assert_eq!(err.target, "[i8][1]");
	assert_eq!(err.partial, Some(Partial::Primitive(Primitive::I8(-56))));
}

#[test]
fn sequence_rejects_maps() {
	assert!(converter().convert_sequence(&Value::map([("a", Value::Null)]), PrimitiveKind::I32).expect_err("map").is_invalid_type());
}

#[test]
fn instant_from_unix_millis() {
	let instant = converter().convert_instant(&Value::I64(1_700_000_000_000), &InstantOptions::unix_millis()).expect("instant");
	assert_eq!(instant, Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).single().expect("valid date"));
}

#[test]
fn instant_from_seconds_and_micros() {
	let conv = converter();
	let seconds = conv.convert_instant(&Value::U32(86_400), &InstantOptions::default()).expect("seconds");
	assert_eq!(seconds, Utc.with_ymd_and_hms(1970, 1, 2, 0, 0, 0).single().expect("valid date"));

	let micros = conv.convert_instant(&Value::I64(1_500_000), &InstantOptions::unix_micros()).expect("micros");
	assert_eq!(micros, DateTime::<Utc>::UNIX_EPOCH + TimeDelta::milliseconds(1500));

	let err = conv.convert_instant(&Value::F64(1.5), &InstantOptions::default()).expect_err("fraction");
	assert!(err.is_lost_decimals());
	assert_eq!(err.partial, Some(Partial::Instant(Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 1).single().expect("valid date"))));

	assert!(conv.convert_instant(&Value::I64(i64::MAX), &InstantOptions::default()).expect_err("range").is_overflow());
}

#[test]
fn instant_from_text() {
	let conv = converter();
	let parsed = conv.convert_instant(&Value::from("2023-11-14T23:13:20.5+01:00"), &InstantOptions::default()).expect("rfc3339");
	assert_eq!(parsed, Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).single().expect("valid date") + TimeDelta::milliseconds(500));

	assert!(conv.convert_instant(&Value::from("yesterday"), &InstantOptions::default()).expect_err("syntax").is_invalid_syntax());

	let custom = InstantOptions::for_format("%Y-%m-%d %H:%M");
	let parsed = conv.convert_instant(&Value::from("2024-02-29 12:30"), &custom).expect("custom");
	assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 2, 29, 12, 30, 0).single().expect("valid date"));

	let located = InstantOptions {
		parse_in_location: Some(2 * 3600),
		..InstantOptions::for_format("%Y-%m-%d")
	};
	let parsed = conv.convert_instant(&Value::from("2024-03-01"), &located).expect("date only");
	let expected = FixedOffset::east_opt(2 * 3600).expect("offset").with_ymd_and_hms(2024, 3, 1, 0, 0, 0).single().expect("valid date");
	assert_eq!(parsed, expected.with_timezone(&Utc));
}

#[test]
fn instant_text_as_number() {
	let options = InstantOptions {
		parse_string_as_number: true,
		..InstantOptions::unix_millis()
	};
	let instant = converter().convert_instant(&Value::from("1700000000000"), &options).expect("numeric text");
	assert_eq!(instant.timestamp(), 1_700_000_000);
}

#[test]
fn instant_binary_layout_round_trips() {
	let at = FixedOffset::east_opt(-5 * 3600)
		.expect("offset")
		.with_ymd_and_hms(2021, 6, 1, 8, 0, 0)
		.single()
		.expect("valid date");
	let encoded = encode_instant_binary(&at);
	assert_eq!(encoded.len(), 15);
	assert_eq!(encoded[0], 1);
	assert_eq!(&encoded[13..], &(-300_i16).to_be_bytes());

	let options = InstantOptions {
		byte_slice_format: BytesFormat::Binary,
		..InstantOptions::default()
	};
	let decoded = converter().convert_instant(&Value::Bytes(encoded), &options).expect("binary");
	assert_eq!(decoded, at.with_timezone(&Utc));

	assert!(converter().convert_instant(&Value::Bytes(vec![1, 2, 3]), &options).expect_err("short").is_invalid_syntax());
}

#[test]
fn instant_rejects_bools_and_containers() {
	let conv = converter();
	assert!(conv.convert_instant(&Value::Bool(true), &InstantOptions::default()).expect_err("bool").is_invalid_type());
	assert!(conv.convert_instant(&Value::Seq(Vec::new()), &InstantOptions::default()).expect_err("seq").is_invalid_type());
}

#[test]
fn duration_from_text() {
	let parsed = converter().convert_duration(&Value::from("8ms"), &DurationOptions::default()).expect("duration");
	assert_eq!(parsed, TimeDelta::milliseconds(8));

	let err = converter().convert_duration(&Value::from("8 parsecs"), &DurationOptions::default()).expect_err("bad unit");
	assert_eq!(err.kind, ConvertErrorKind::InvalidSyntax("unknown unit \" parsecs\" in duration \"8 parsecs\"".to_owned()));
}

#[test]
fn duration_from_numbers_scales_by_unit() {
	let conv = converter();
	assert_eq!(conv.convert_duration(&Value::I64(1500), &DurationOptions::default()).expect("nanos"), TimeDelta::nanoseconds(1500));
	assert_eq!(
		conv.convert_duration(&Value::U8(3), &DurationOptions::for_unit(DurationUnit::Minutes)).expect("minutes"),
		TimeDelta::minutes(3)
	);
	assert_eq!(
		conv.convert_duration(&Value::F64(2.0), &DurationOptions::for_unit(DurationUnit::Seconds)).expect("seconds"),
		TimeDelta::seconds(2)
	);

	let err = conv.convert_duration(&Value::F64(2.5), &DurationOptions::for_unit(DurationUnit::Seconds)).expect_err("fraction");
	assert!(err.is_lost_decimals());
	assert_eq!(err.partial, Some(Partial::Duration(TimeDelta::seconds(2))));

	let err = conv.convert_duration(&Value::I64(i64::MAX / 1000), &DurationOptions::for_unit(DurationUnit::Hours)).expect_err("overflow");
	assert!(err.is_overflow());
	assert!(err.partial.is_some());

	assert!(conv.convert_duration(&Value::Bool(true), &DurationOptions::default()).expect_err("bool").is_invalid_type());
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Level(u8);

impl ForeignValue for Level {
	fn type_name(&self) -> &str {
		"Level"
	}

	fn to_basic(&self) -> Option<Value> {
		Some(Value::U8(self.0))
	}
}

#[derive(Debug)]
struct Opaque;

impl ForeignValue for Opaque {
	fn type_name(&self) -> &str {
		"Opaque"
	}

	fn to_basic(&self) -> Option<Value> {
		None
	}
}

#[derive(Debug)]
struct Exploding;

impl ForeignValue for Exploding {
	fn type_name(&self) -> &str {
		"Exploding"
	}

	fn to_basic(&self) -> Option<Value> {
		panic!("basic value unavailable")
	}
}

#[derive(Debug)]
struct Loop;

impl ForeignValue for Loop {
	fn type_name(&self) -> &str {
		"Loop"
	}

	fn to_basic(&self) -> Option<Value> {
		Some(Value::from(Foreign::new(Loop)).boxed())
	}
}

#[derive(Debug, Clone, PartialEq)]
struct Token(String);

crate::convert_newtype!(Token(String));

impl ForeignValue for Token {
	fn type_name(&self) -> &str {
		"Token"
	}

	fn to_basic(&self) -> Option<Value> {
		None
	}
}

#[test]
fn foreign_aliases_canonicalize() {
	let level = Value::from(Foreign::new(Level(3)));
	assert_eq!(to(level.clone(), PrimitiveKind::String), Primitive::String("3".to_owned()));
	assert_eq!(to(level.clone(), PrimitiveKind::I64), Primitive::I64(3));
	assert_eq!(converter().convert_sequence(&level, PrimitiveKind::U8).expect("seq"), Array::U8(vec![3]));
	assert_eq!(convert::<TimeDelta>(&level).expect("duration"), TimeDelta::nanoseconds(3));

	let err = fails(Value::from(Foreign::new(Level(200))), PrimitiveKind::I8);
	assert!(err.is_overflow());
	assert_eq!(err.value_type, "Level");
}

#[test]
fn foreign_without_basic_is_invalid_type() {
	let opaque = Value::from(Foreign::new(Opaque));
	let err = fails(opaque.clone(), PrimitiveKind::I32);
	assert!(err.is_invalid_type());
	assert_eq!(err.value_type, "Opaque");

	let basic = converter().to_basic(&opaque).expect_err("no basic form");
	assert_eq!(basic.kind, ConvertErrorKind::CannotConvertToBasic);
	let basic = converter().to_basic(&Value::I32(1)).expect_err("already basic");
	assert_eq!(basic.kind, ConvertErrorKind::AlreadyBasicType);
	assert_eq!(converter().to_basic(&Value::from(Foreign::new(Level(9)))).expect("basic"), Value::U8(9));
}

#[test]
fn panicking_foreign_hook_is_recovered() {
	let exploding = Value::from(Foreign::new(Exploding));
	let err = fails(exploding, PrimitiveKind::I32);
	assert_eq!(err.kind, ConvertErrorKind::RecoveredPanic("basic value unavailable".to_owned()));
}

#[test]
fn self_referencing_foreign_is_invalid_type() {
	let looping = Value::from(Foreign::new(Loop));
	let err = fails(looping.clone(), PrimitiveKind::I32);
	assert!(err.is_invalid_type());
	assert_eq!(err.value_type, "Loop");

	assert!(fails(looping.clone().boxed(), PrimitiveKind::String).is_invalid_type());
	assert!(converter().convert_sequence(&looping, PrimitiveKind::U8).expect_err("sequence").is_invalid_type());
}

#[test]
fn foreign_instants_and_durations_pass_through() {
	let at = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).single().expect("valid date");
	assert_eq!(convert::<DateTime<Utc>>(&Value::from(Foreign::new(at))).expect("instant"), at);

	let span = Value::from(Foreign::new(TimeDelta::seconds(5)));
	assert_eq!(convert::<TimeDelta>(&span).expect("duration"), TimeDelta::seconds(5));
	assert_eq!(to(span, PrimitiveKind::I64), Primitive::I64(5_000_000_000));
}

#[test]
fn generic_entry_and_lossy_mode() {
	let conv = converter();
	assert_eq!(conv.convert_to::<u16>(&Value::from("65535")).expect("u16"), u16::MAX);
	assert!(conv.convert_to::<i64>(&Value::F64(2.12)).expect_err("decimals").is_lost_decimals());
	assert_eq!(conv.convert_lossy::<i64>(&Value::F64(2.12)).expect("lossy"), 2);
	assert_eq!(conv.convert_lossy::<i32>(&Value::I64(i64::MAX)).expect("lossy"), -1);
	assert!(conv.convert_lossy::<i32>(&Value::from("x")).expect_err("fatal").is_invalid_syntax());
	assert_eq!(conv.convert_to::<Vec<f64>>(&Value::seq([Value::I8(1), Value::from("2.5")])).expect("vec"), vec![1.0, 2.5]);
}

#[test]
fn maps_from_sequences_and_maps() {
	let conv = converter();
	let from_seq: HashMap<u8, String> = conv.convert_to(&Value::seq([Value::from("a"), Value::I32(2)])).expect("seq map");
	assert_eq!(from_seq, HashMap::from([(0, "a".to_owned()), (1, "2".to_owned())]));

	let from_map: HashMap<i32, bool> = conv.convert_to(&Value::map([("1", Value::from("true")), ("-2", Value::I8(0))])).expect("map");
	assert_eq!(from_map, HashMap::from([(1, true), (-2, false)]));

	let keyed = KeyedMap::new(PrimitiveKind::U64).with(MapKey::U64(5), Value::F64(0.5));
	let from_keyed: HashMap<String, f32> = conv.convert_to(&Value::from(keyed)).expect("keyed");
	assert_eq!(from_keyed, HashMap::from([("5".to_owned(), 0.5)]));

	let err = conv.convert_to::<HashMap<u8, i32>>(&Value::map([("x", Value::I32(1))])).expect_err("bad key");
	assert!(err.is_invalid_syntax());
	assert_eq!(err.target, "map key u8");

	assert!(conv.convert_to::<HashMap<u8, i32>>(&Value::I32(1)).expect_err("scalar").is_invalid_type());
}

#[derive(Debug, Clone, PartialEq)]
struct Celsius(f64);

#[derive(Debug, Clone, PartialEq)]
struct Tags(Vec<String>);

crate::convert_newtype!(Celsius(f64), Tags(Vec<String>));

#[test]
fn newtypes_wrap_their_inner_conversion() {
	let conv = converter();
	assert_eq!(conv.convert_to::<Celsius>(&Value::from("21.5")).expect("celsius"), Celsius(21.5));
	assert_eq!(conv.convert_to::<Tags>(&Value::from("solo")).expect("tags"), Tags(vec!["solo".to_owned()]));

	let err = conv.convert_to::<Celsius>(&Value::from("warm")).expect_err("syntax");
	assert_eq!(err.target, "Celsius");
	assert_eq!(
		<Celsius as super::Convert>::shape(),
		TypeShape::Alias {
			name: "Celsius",
			of: Box::new(TypeShape::Primitive(PrimitiveKind::F64)),
		}
	);
}

#[test]
fn convert_by_type_dispatches() {
	let conv = converter();
	let boxed = conv.convert_by_type(&Value::from("12"), std::any::TypeId::of::<i16>()).expect("i16");
	assert_eq!(boxed.downcast_ref::<i16>(), Some(&12));

	let boxed = conv.convert_by_type(&Value::seq([Value::I32(1)]), std::any::TypeId::of::<Vec<u64>>()).expect("vec");
	assert_eq!(boxed.downcast_ref::<Vec<u64>>(), Some(&vec![1]));

	let boxed = conv.convert_by_type(&Value::from("1s"), std::any::TypeId::of::<TimeDelta>()).expect("duration");
	assert_eq!(boxed.downcast_ref::<TimeDelta>(), Some(&TimeDelta::seconds(1)));

	let err = conv.convert_by_type(&Value::I32(1), std::any::TypeId::of::<Celsius>()).expect_err("unregistered");
	assert!(err.is_invalid_type());

	let custom = converter().with_registry(TypeRegistry::with_defaults().with::<Celsius>());
	let boxed = custom.convert_by_type(&Value::I32(1), std::any::TypeId::of::<Celsius>()).expect("registered");
	assert_eq!(boxed.downcast_ref::<Celsius>(), Some(&Celsius(1.0)));
}

#[test]
fn convert_by_type_returns_held_foreign_values() {
	let conv = converter().with_registry(TypeRegistry::with_defaults().with::<Token>());
	let held = Value::from(Foreign::new(Token("abc".to_owned())));

	assert_eq!(conv.convert_to::<Token>(&held).expect("generic"), Token("abc".to_owned()));
	let boxed = conv.convert_by_type(&held, std::any::TypeId::of::<Token>()).expect("by type");
	assert_eq!(boxed.downcast_ref::<Token>(), Some(&Token("abc".to_owned())));

	let boxed = conv.convert_by_type(&held.clone().boxed(), std::any::TypeId::of::<Token>()).expect("behind a reference");
	assert_eq!(boxed.downcast_ref::<Token>(), Some(&Token("abc".to_owned())));

	assert!(conv.convert_by_type(&held, std::any::TypeId::of::<Celsius>()).expect_err("not held").is_invalid_type());
}

#[test]
fn default_registry_covers_canonical_types() {
	let registry = TypeRegistry::global();
	for kind in PrimitiveKind::ALL {
		assert!(registry.contains(kind.type_id()), "{kind} registered");
		assert!(registry.contains(kind.sequence_type_id()), "[{kind}] registered");
	}
	assert!(registry.contains(std::any::TypeId::of::<DateTime<Utc>>()));
	assert_eq!(registry.len(), PrimitiveKind::ALL.len() * 2 + 2);
}

#[test]
fn value_targets() {
	let conv = Converter::new(ConvertOptions {
		duration: DurationOptions::for_unit(DurationUnit::Milliseconds),
		..ConvertOptions::default()
	});
	assert_eq!("i32".parse::<Target>().expect("target"), Target::Primitive(PrimitiveKind::I32));
	assert_eq!("[string]".parse::<Target>().expect("target"), Target::Sequence(PrimitiveKind::String));
	assert_eq!("bytes".parse::<Target>().expect("target"), Target::Sequence(PrimitiveKind::U8));
	assert!("i128".parse::<Target>().is_err());

	assert_eq!(conv.convert_value(&Value::from("7"), Target::Primitive(PrimitiveKind::U8)).expect("u8"), Value::U8(7));
	let span = conv.convert_value(&Value::I32(250), Target::Duration).expect("duration");
	assert_eq!(span, Value::from(Foreign::new(TimeDelta::milliseconds(250))));
}

#[test]
fn options_load_from_partial_json() {
	let options: ConvertOptions = serde_json::from_str(r#"{"instant":{"number_format":"unix_milli"}}"#).expect("options");
	assert_eq!(options.instant, InstantOptions::unix_millis());
	assert_eq!(options.duration, DurationOptions::default());
}
