use std::path::Path;

use tract_onnx::prelude::*;
use tract_onnx::tract_hir::infer::Factoid;
use tracing::info;

use crate::error::{LoadError, PredictError};
use crate::models::{column_kind, BookingInquiry, ColumnKind, FieldValue, RawLabel, COLUMNS};
use crate::pipeline::Classifier;

/// One model input, fed from a schema column.
#[derive(Debug, Clone, Copy)]
struct Binding {
    column: usize,
    datum: DatumType,
}

/// Classifier backed by an ONNX graph whose inputs are the booking columns,
/// one `[1, 1]` tensor each, matched by input name.
pub struct OnnxClassifier {
    plan: TypedRunnableModel<TypedModel>,
    bindings: Vec<Binding>,
}

impl OnnxClassifier {
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let onnx_err = |e: TractError| LoadError::Onnx {
            path: path.to_path_buf(),
            message: format!("{e:#}"),
        };

        let mut model = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(onnx_err)?;

        let outlets = model.input_outlets().map_err(onnx_err)?.to_vec();
        let mut bindings = Vec::with_capacity(outlets.len());
        for (ix, outlet) in outlets.iter().enumerate() {
            let name = model.node(outlet.node).name.clone();
            let column = COLUMNS
                .iter()
                .position(|c| *c == name)
                .ok_or_else(|| LoadError::UnknownInput(name.clone()))?;
            let kind = column_kind(&name).ok_or_else(|| LoadError::UnknownInput(name.clone()))?;

            let datum = model
                .input_fact(ix)
                .map_err(onnx_err)?
                .datum_type
                .concretize()
                .unwrap_or_else(|| default_datum(kind));
            if !accepts(kind, datum) {
                return Err(LoadError::InputType {
                    column: name,
                    datum: format!("{datum:?}"),
                    kind,
                });
            }

            model
                .set_input_fact(ix, InferenceFact::dt_shape(datum, tvec!(1usize, 1)))
                .map_err(onnx_err)?;
            bindings.push(Binding { column, datum });
        }

        let plan = model
            .into_optimized()
            .map_err(onnx_err)?
            .into_runnable()
            .map_err(onnx_err)?;

        info!(path = %path.display(), inputs = bindings.len(), "onnx classifier loaded");
        Ok(Self { plan, bindings })
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, inquiry: &BookingInquiry) -> Result<RawLabel, PredictError> {
        let columns = inquiry.columns();
        let inputs: TVec<TValue> = self
            .bindings
            .iter()
            .map(|b| {
                let (name, value) = &columns[b.column];
                cell(value, b.datum)
                    .map(TValue::from)
                    .ok_or_else(|| PredictError::ColumnType {
                        column: name.to_string(),
                        expected: format!("{:?}", b.datum),
                    })
            })
            .collect::<Result<_, _>>()?;

        let outputs = self
            .plan
            .run(inputs)
            .map_err(|e| PredictError::Inference(format!("{e:#}")))?;
        let label = outputs.first().ok_or(PredictError::EmptyOutput)?;
        first_label(label)
    }
}

fn default_datum(kind: ColumnKind) -> DatumType {
    match kind {
        ColumnKind::Integer => DatumType::I64,
        ColumnKind::Float => DatumType::F32,
        ColumnKind::Text => DatumType::String,
    }
}

fn accepts(kind: ColumnKind, datum: DatumType) -> bool {
    matches!(
        (kind, datum),
        (
            ColumnKind::Integer,
            DatumType::I64 | DatumType::I32 | DatumType::F32 | DatumType::F64
        ) | (ColumnKind::Float, DatumType::F32 | DatumType::F64)
            | (ColumnKind::Text, DatumType::String)
    )
}

/// A `[1, 1]` tensor holding `value` as `datum`, if the conversion is lossless
/// enough for the model to consume.
fn cell(value: &FieldValue, datum: DatumType) -> Option<Tensor> {
    use tract_ndarray::arr2;

    let tensor = match (value, datum) {
        (FieldValue::Int(v), DatumType::I64) => arr2(&[[*v]]).into_tensor(),
        (FieldValue::Int(v), DatumType::I32) => arr2(&[[i32::try_from(*v).ok()?]]).into_tensor(),
        (FieldValue::Int(v), DatumType::F32) => arr2(&[[*v as f32]]).into_tensor(),
        (FieldValue::Int(v), DatumType::F64) => arr2(&[[*v as f64]]).into_tensor(),
        (FieldValue::Float(v), DatumType::F32) => arr2(&[[*v as f32]]).into_tensor(),
        (FieldValue::Float(v), DatumType::F64) => arr2(&[[*v]]).into_tensor(),
        (FieldValue::Text(v), DatumType::String) => arr2(&[[v.clone()]]).into_tensor(),
        _ => return None,
    };
    Some(tensor)
}

/// First element of the label output.
fn first_label(output: &Tensor) -> Result<RawLabel, PredictError> {
    fn first<T: Datum + Clone>(t: &Tensor) -> Option<T> {
        t.as_slice::<T>().ok().and_then(|s| s.first().cloned())
    }

    let label = match output.datum_type() {
        DatumType::I64 => first::<i64>(output).map(RawLabel::Int),
        DatumType::I32 => first::<i32>(output).map(|v| RawLabel::Int(v.into())),
        DatumType::F32 => first::<f32>(output).map(|v| RawLabel::Float(v.into())),
        DatumType::F64 => first::<f64>(output).map(RawLabel::Float),
        DatumType::String => first::<String>(output).map(RawLabel::Text),
        other => return Err(PredictError::OutputType(format!("{other:?}"))),
    };
    label.ok_or(PredictError::EmptyOutput)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use prost::Message;
    use tract_ndarray::arr1;
    use tract_onnx::pb;

    // onnx TensorProto.DataType codes
    const FLOAT: i32 = 1;
    const INT64: i32 = 7;
    const STRING: i32 = 8;

    fn value_info(name: &str, elem_type: i32) -> pb::ValueInfoProto {
        pb::ValueInfoProto {
            name: name.to_string(),
            r#type: Some(pb::TypeProto {
                value: Some(pb::type_proto::Value::TensorType(pb::type_proto::Tensor {
                    elem_type,
                    ..Default::default()
                })),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// Writes a one-node graph copying `input` straight to a `label` output.
    fn identity_model(dir: &Path, input: &str, elem_type: i32) -> PathBuf {
        let graph = pb::GraphProto {
            name: "passthrough".to_string(),
            node: vec![pb::NodeProto {
                name: "copy".to_string(),
                op_type: "Identity".to_string(),
                input: vec![input.to_string()],
                output: vec!["label".to_string()],
                ..Default::default()
            }],
            input: vec![value_info(input, elem_type)],
            output: vec![value_info("label", elem_type)],
            ..Default::default()
        };
        let model = pb::ModelProto {
            ir_version: 7,
            opset_import: vec![pb::OperatorSetIdProto {
                domain: String::new(),
                version: 13,
            }],
            graph: Some(graph),
            ..Default::default()
        };

        let path = dir.join("model.onnx");
        std::fs::write(&path, model.encode_to_vec()).unwrap();
        path
    }

    fn inquiry(repeated: i64) -> BookingInquiry {
        BookingInquiry {
            number_of_adults: 2,
            number_of_children: 0,
            number_of_weekend_nights: 1,
            number_of_week_nights: 2,
            type_of_meal: "Meal Plan 1".into(),
            car_parking_space: 0,
            room_type: "Room_Type 1".into(),
            lead_time: 14,
            market_segment_type: "Online".into(),
            repeated,
            p_c: 0,
            p_not_c: 1,
            average_price: 88.5,
            special_requests: 1,
            date_of_reservation: "2018-10-02".into(),
        }
    }

    #[test]
    fn integer_column_drives_integer_label() {
        let dir = tempfile::tempdir().unwrap();
        let path = identity_model(dir.path(), "repeated", INT64);
        let model = OnnxClassifier::load(&path).unwrap();
        assert_eq!(model.predict(&inquiry(1)).unwrap(), RawLabel::Int(1));
        assert_eq!(model.predict(&inquiry(0)).unwrap(), RawLabel::Int(0));
    }

    #[test]
    fn string_column_drives_string_label() {
        let dir = tempfile::tempdir().unwrap();
        let path = identity_model(dir.path(), "market segment type", STRING);
        let model = OnnxClassifier::load(&path).unwrap();
        assert_eq!(
            model.predict(&inquiry(0)).unwrap(),
            RawLabel::Text("Online".into())
        );
    }

    #[test]
    fn price_column_binds_with_trailing_space() {
        let dir = tempfile::tempdir().unwrap();
        let path = identity_model(dir.path(), "average price ", FLOAT);
        let model = OnnxClassifier::load(&path).unwrap();
        assert_eq!(model.predict(&inquiry(0)).unwrap(), RawLabel::Float(88.5));
    }

    #[test]
    fn unknown_input_name_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = identity_model(dir.path(), "hotel", INT64);
        match OnnxClassifier::load(&path).err().unwrap() {
            LoadError::UnknownInput(name) => assert_eq!(name, "hotel"),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn mistyped_input_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = identity_model(dir.path(), "type of meal", FLOAT);
        let err = OnnxClassifier::load(&path).err().unwrap();
        assert!(matches!(
            err,
            LoadError::InputType { kind: ColumnKind::Text, .. }
        ));
        assert!(err.to_string().contains("a string column cannot supply"));
    }

    #[test]
    fn integer_columns_feed_numeric_inputs() {
        let t = cell(&FieldValue::Int(3), DatumType::I64).unwrap();
        assert_eq!(t.shape(), &[1, 1]);
        assert_eq!(t.as_slice::<i64>().unwrap(), &[3]);

        let t = cell(&FieldValue::Int(3), DatumType::F32).unwrap();
        assert_eq!(t.as_slice::<f32>().unwrap(), &[3.0]);
    }

    #[test]
    fn out_of_range_i32_is_refused() {
        assert!(cell(&FieldValue::Int(i64::MAX), DatumType::I32).is_none());
        assert!(cell(&FieldValue::Int(7), DatumType::I32).is_some());
    }

    #[test]
    fn text_columns_only_feed_strings() {
        let t = cell(&FieldValue::Text("Online".into()), DatumType::String).unwrap();
        assert_eq!(t.as_slice::<String>().unwrap(), &["Online".to_string()]);
        assert!(cell(&FieldValue::Text("Online".into()), DatumType::I64).is_none());
        assert!(cell(&FieldValue::Float(1.5), DatumType::I64).is_none());
    }

    #[test]
    fn declared_types_are_checked_per_kind() {
        assert!(accepts(ColumnKind::Integer, DatumType::F64));
        assert!(accepts(ColumnKind::Float, DatumType::F32));
        assert!(!accepts(ColumnKind::Float, DatumType::I64));
        assert!(!accepts(ColumnKind::Text, DatumType::F32));
        assert_eq!(default_datum(ColumnKind::Text), DatumType::String);
        assert_eq!(default_datum(ColumnKind::Integer), DatumType::I64);
    }

    #[test]
    fn reads_integer_and_string_labels() {
        let ints = arr1(&[0i64, 1]).into_tensor();
        assert_eq!(first_label(&ints).unwrap(), RawLabel::Int(0));

        let text = arr1(&["Not_Canceled".to_string()]).into_tensor();
        assert_eq!(
            first_label(&text).unwrap(),
            RawLabel::Text("Not_Canceled".into())
        );
    }

    #[test]
    fn float_labels_keep_their_type() {
        let t = arr1(&[1.0f32]).into_tensor();
        assert_eq!(first_label(&t).unwrap(), RawLabel::Float(1.0));
    }

    #[test]
    fn empty_or_unsupported_output_is_an_error() {
        let empty = arr1::<i64>(&[]).into_tensor();
        assert!(matches!(first_label(&empty), Err(PredictError::EmptyOutput)));

        let flags = arr1(&[true]).into_tensor();
        assert!(matches!(first_label(&flags), Err(PredictError::OutputType(_))));
    }

    #[test]
    fn missing_model_file_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.onnx");
        assert!(matches!(
            OnnxClassifier::load(&path),
            Err(LoadError::Onnx { .. })
        ));
    }
}
