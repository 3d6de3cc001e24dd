use async_graphql::{InputValueError, InputValueResult, Scalar, ScalarType, Value};

/// Race time exchanged as `H:MM:SS[.mmm]`. Input also accepts a number of milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunTime(pub infra::run_time::RunTime);

#[Scalar(name = "RunTime")]
impl ScalarType for RunTime {
    fn parse(value: Value) -> InputValueResult<Self> {
        match &value {
            Value::String(s) => s
                .parse::<infra::run_time::RunTime>()
                .map(RunTime)
                .map_err(InputValueError::custom),
            Value::Number(n) => {
                let millis = n
                    .as_i64()
                    .ok_or_else(|| InputValueError::custom("run time must be whole milliseconds"))?;
                infra::run_time::RunTime::try_from_millis(millis)
                    .map(RunTime)
                    .map_err(InputValueError::custom)
            }
            _ => Err(InputValueError::expected_type(value)),
        }
    }

    fn to_value(&self) -> Value {
        Value::String(self.0.to_string())
    }
}

impl From<infra::run_time::RunTime> for RunTime {
    fn from(value: infra::run_time::RunTime) -> Self {
        RunTime(value)
    }
}
