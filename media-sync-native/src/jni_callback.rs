use jni::objects::JObject;
use jni::{JNIEnv, errors};

use crate::channel::{MethodResponse, MethodResult};

const CALLBACK_SUCCESS_SIG: &str = "(Ljava/lang/String;)V";
const CALLBACK_ERROR_SIG: &str = "(Ljava/lang/String;Ljava/lang/String;)V";

/// Wraps a Java `MethodResultCallback` so it can be answered from any thread.
///
/// `JNIEnv` cannot cross threads, so the reply keeps the `JavaVM` and a
/// global reference to the callback and attaches whichever thread replies.
pub fn method_result(env: &JNIEnv, callback: &JObject) -> errors::Result<MethodResult> {
    let jvm = env.get_java_vm()?;
    let callback = env.new_global_ref(callback)?;

    Ok(MethodResult::new(move |response| {
        match jvm.attach_current_thread() {
            Ok(mut env) => call_java_fn(&mut env, &callback, &response),
            Err(e) => tracing::error!("Could not attach reply thread to the JVM: {e}"),
        }
    }))
}

/// Answers `callback` on the current thread.
///
/// Also used directly when no [`MethodResult`] could be built for it.
pub fn call_java_fn(env: &mut JNIEnv, callback: &JObject, response: &MethodResponse) {
    let result = match response {
        MethodResponse::Success(value) => match serde_json::to_string(value) {
            Ok(json) => env.new_string(json).and_then(|json| {
                env.call_method(callback, "success", CALLBACK_SUCCESS_SIG, &[(&json).into()])
            }),
            Err(e) => {
                tracing::error!("Could not encode reply payload: {e}");
                return;
            }
        },

        MethodResponse::Error { code, message } => {
            env.new_string(code).and_then(|code| {
                let message = env.new_string(message)?;
                env.call_method(
                    callback,
                    "error",
                    CALLBACK_ERROR_SIG,
                    &[(&code).into(), (&message).into()],
                )
            })
        }

        MethodResponse::NotImplemented => env.call_method(callback, "notImplemented", "()V", &[]),
    };

    if let Err(e) = result {
        tracing::error!("Error calling java method: {e}");
        clear_pending_exception(env);
    }
}

/// A failed JNI call can leave an exception pending, and no further JNI
/// calls are allowed on this thread until it is cleared.
pub fn clear_pending_exception(env: &mut JNIEnv) {
    if env.exception_check().unwrap_or(false) {
        let _ = env.exception_describe();
        let _ = env.exception_clear();
    }
}
