// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android preference backend via JNI.
//
// Requires the Android NDK and targets `aarch64-linux-android` or
// `armv7-linux-androideabi`. Each operation calls into
// `android.content.SharedPreferences` on the ART runtime.
//
// ## Architecture notes
//
// Writes go through `SharedPreferences.Editor.commit()`, which blocks until
// the change is on disk, rather than `apply()`, which only schedules it.
//
// Reads go through `getAll().get(key)` and inspect the returned object's
// class, so a value of the wrong kind surfaces as `TypeMismatch` in the
// facade instead of a Java `ClassCastException`. Entries written by other
// code as `long` or `float` are reported as `UnsupportedValue`.

#![cfg(target_os = "android")]

use std::collections::BTreeSet;

use jni::objects::{JObject, JObjectArray, JString, JValue};
use jni::{JNIEnv, JavaVM};

use prefkit_core::error::{PrefsError, Result};
use prefkit_core::{PrefValue, PrefsBackend};

// ---------------------------------------------------------------------------
// JNI bootstrap helpers
// ---------------------------------------------------------------------------

/// `Context.MODE_PRIVATE`.
const MODE_PRIVATE: i32 = 0;

/// Local reference capacity reserved for one backend operation.
const LOCAL_FRAME_CAPACITY: i32 = 32;

const EDITOR_SIG: &str = "()Landroid/content/SharedPreferences$Editor;";

/// Convenience: map any `jni::errors::Error` into `PrefsError::Bridge`,
/// clearing a pending Java exception so the thread stays usable.
fn jni_err(env: &mut JNIEnv<'_>, context: &str, e: jni::errors::Error) -> PrefsError {
    if matches!(e, jni::errors::Error::JavaException) {
        let _ = env.exception_describe();
        let _ = env.exception_clear();
    }
    PrefsError::Bridge(format!("{context}: {e}"))
}

/// Run `f` with an attached [`JNIEnv`] and the hosting Android `Context`.
///
/// The `JavaVM*` and context `jobject` come from `ndk_context`, which the
/// NDK glue (`android_main` / `ANativeActivity_onCreate`) fills in. Local
/// references created by `f` are released in a local frame when it returns.
fn with_env<T>(f: impl FnOnce(&mut JNIEnv<'_>, &JObject<'_>) -> Result<T>) -> Result<T> {
    // `android_context()` panics when the NDK glue never ran (e.g. a bare
    // executable launched from a shell); report that as a bridge error.
    let ctx = std::panic::catch_unwind(ndk_context::android_context).map_err(|_| {
        PrefsError::Bridge("Android context not initialised: no hosting activity".into())
    })?;
    // SAFETY: `ctx.vm()` returns the `JavaVM*` set by the NDK glue code.
    // The pointer is valid for the lifetime of the process.
    let vm = unsafe { JavaVM::from_raw(ctx.vm().cast()) }
        .map_err(|e| PrefsError::Bridge(format!("failed to obtain JavaVM: {e}")))?;
    let mut guard = vm
        .attach_current_thread()
        .map_err(|e| PrefsError::Bridge(format!("failed to attach JNI thread: {e}")))?;
    let env: &mut JNIEnv<'_> = &mut guard;

    let ptr = ctx.context();
    if ptr.is_null() {
        return Err(PrefsError::Bridge(
            "Android context is null: native activity not initialised".into(),
        ));
    }
    // SAFETY: the NDK guarantees this pointer is a valid global jobject for
    // the hosting Context. We never delete it.
    let context = unsafe { JObject::from_raw(ptr.cast()) };

    env.push_local_frame(LOCAL_FRAME_CAPACITY)
        .map_err(|e| PrefsError::Bridge(format!("push_local_frame: {e}")))?;
    let result = f(env, &context);
    // SAFETY: balanced with the push above; no local from the frame escapes.
    let _ = unsafe { env.pop_local_frame(&JObject::null()) };
    result
}

// ---------------------------------------------------------------------------
// Backend struct
// ---------------------------------------------------------------------------

/// `SharedPreferences`-backed implementation of [`PrefsBackend`].
///
/// The struct only remembers the preference file name; all state lives on
/// the Java side.
pub struct AndroidPrefsBackend {
    store_name: Option<String>,
}

impl AndroidPrefsBackend {
    /// Create a backend over the named `SharedPreferences` file, or the
    /// app's default file (`<package>_preferences`) when `store_name` is `None`.
    ///
    /// This does **not** touch JNI; see [`AndroidPrefsBackend::open`] for a
    /// constructor that checks the store is reachable.
    pub fn new(store_name: Option<&str>) -> Self {
        Self {
            store_name: store_name.map(str::to_owned),
        }
    }

    /// Create the backend and resolve its `SharedPreferences` once, so a
    /// missing Android context fails here instead of on first use.
    pub fn open(store_name: Option<&str>) -> Result<Self> {
        let backend = Self::new(store_name);
        with_env(|env, context| backend.shared_preferences(env, context).map(|_| ()))?;
        tracing::info!(store = ?backend.store_name, "Android: SharedPreferences ready");
        Ok(backend)
    }

    /// Obtain the `SharedPreferences` object in private mode.
    fn shared_preferences<'a>(
        &self,
        env: &mut JNIEnv<'a>,
        context: &JObject<'_>,
    ) -> Result<JObject<'a>> {
        let name = match &self.store_name {
            Some(name) => name.clone(),
            None => format!("{}_preferences", package_name(env, context)?),
        };
        let j_name: JString = env
            .new_string(&name)
            .map_err(|e| jni_err(env, "new_string(prefs_name)", e))?;

        env.call_method(
            context,
            "getSharedPreferences",
            "(Ljava/lang/String;I)Landroid/content/SharedPreferences;",
            &[JValue::Object(&j_name), JValue::Int(MODE_PRIVATE)],
        )
        .and_then(|v| v.l())
        .map_err(|e| jni_err(env, "getSharedPreferences", e))
    }

    /// Open an editor, let `edit` stage changes, then `commit()` synchronously.
    fn commit_edit(
        &self,
        what: &str,
        edit: impl FnOnce(&mut JNIEnv<'_>, &JObject<'_>) -> Result<()>,
    ) -> Result<()> {
        with_env(|env, context| {
            let prefs = self.shared_preferences(env, context)?;
            let editor = env
                .call_method(&prefs, "edit", EDITOR_SIG, &[])
                .and_then(|v| v.l())
                .map_err(|e| jni_err(env, "SharedPreferences.edit", e))?;

            edit(env, &editor)?;

            let committed = env
                .call_method(&editor, "commit", "()Z", &[])
                .and_then(|v| v.z())
                .map_err(|e| jni_err(env, "editor.commit", e))?;
            if !committed {
                return Err(PrefsError::Bridge(format!(
                    "SharedPreferences commit failed during {what}"
                )));
            }
            Ok(())
        })
    }
}

impl PrefsBackend for AndroidPrefsBackend {
    fn backend_name(&self) -> &str {
        "Android SharedPreferences"
    }

    fn load(&self, key: &str) -> Result<Option<PrefValue>> {
        with_env(|env, context| {
            let prefs = self.shared_preferences(env, context)?;
            let all = env
                .call_method(&prefs, "getAll", "()Ljava/util/Map;", &[])
                .and_then(|v| v.l())
                .map_err(|e| jni_err(env, "SharedPreferences.getAll", e))?;

            let j_key: JString = env
                .new_string(key)
                .map_err(|e| jni_err(env, "new_string(key)", e))?;
            let value = env
                .call_method(
                    &all,
                    "get",
                    "(Ljava/lang/Object;)Ljava/lang/Object;",
                    &[JValue::Object(&j_key)],
                )
                .and_then(|v| v.l())
                .map_err(|e| jni_err(env, "Map.get", e))?;

            if value.is_null() {
                tracing::debug!(key, "Android: preference not found");
                return Ok(None);
            }
            classify(env, key, &value).map(Some)
        })
    }

    fn store(&self, key: &str, value: &PrefValue) -> Result<()> {
        tracing::info!(key, kind = %value.kind(), "Android: storing preference");

        self.commit_edit("store", |env, editor| {
            let j_key: JString = env
                .new_string(key)
                .map_err(|e| jni_err(env, "new_string(key)", e))?;

            let result = match value {
                PrefValue::String(s) => {
                    let j_value = env
                        .new_string(s)
                        .map_err(|e| jni_err(env, "new_string(value)", e))?;
                    env.call_method(
                        editor,
                        "putString",
                        "(Ljava/lang/String;Ljava/lang/String;)Landroid/content/SharedPreferences$Editor;",
                        &[JValue::Object(&j_key), JValue::Object(&j_value)],
                    )
                }
                PrefValue::StringSet(set) => {
                    let j_set = new_hash_set(env, set)?;
                    env.call_method(
                        editor,
                        "putStringSet",
                        "(Ljava/lang/String;Ljava/util/Set;)Landroid/content/SharedPreferences$Editor;",
                        &[JValue::Object(&j_key), JValue::Object(&j_set)],
                    )
                }
                PrefValue::Int(n) => env.call_method(
                    editor,
                    "putInt",
                    "(Ljava/lang/String;I)Landroid/content/SharedPreferences$Editor;",
                    &[JValue::Object(&j_key), JValue::Int(*n)],
                ),
                PrefValue::Bool(b) => env.call_method(
                    editor,
                    "putBoolean",
                    "(Ljava/lang/String;Z)Landroid/content/SharedPreferences$Editor;",
                    &[JValue::Object(&j_key), JValue::Bool(u8::from(*b))],
                ),
            };
            result.map_err(|e| jni_err(env, "editor.put", e))?;
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        tracing::info!(key, "Android: removing preference");

        self.commit_edit("remove", |env, editor| {
            let j_key: JString = env
                .new_string(key)
                .map_err(|e| jni_err(env, "new_string(key)", e))?;
            env.call_method(
                editor,
                "remove",
                "(Ljava/lang/String;)Landroid/content/SharedPreferences$Editor;",
                &[JValue::Object(&j_key)],
            )
            .map_err(|e| jni_err(env, "editor.remove", e))?;
            Ok(())
        })
    }

    fn clear(&self) -> Result<()> {
        tracing::info!("Android: clearing preferences");

        self.commit_edit("clear", |env, editor| {
            env.call_method(editor, "clear", EDITOR_SIG, &[])
                .map_err(|e| jni_err(env, "editor.clear", e))?;
            Ok(())
        })
    }

    fn keys(&self) -> Result<Vec<String>> {
        with_env(|env, context| {
            let prefs = self.shared_preferences(env, context)?;
            let all = env
                .call_method(&prefs, "getAll", "()Ljava/util/Map;", &[])
                .and_then(|v| v.l())
                .map_err(|e| jni_err(env, "SharedPreferences.getAll", e))?;
            let key_set = env
                .call_method(&all, "keySet", "()Ljava/util/Set;", &[])
                .and_then(|v| v.l())
                .map_err(|e| jni_err(env, "Map.keySet", e))?;
            collect_strings(env, &key_set)
        })
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Turn a boxed Java preference value into a [`PrefValue`].
fn classify(env: &mut JNIEnv<'_>, key: &str, value: &JObject<'_>) -> Result<PrefValue> {
    if is_instance(env, value, "java/lang/String")? {
        return java_string(env, value).map(PrefValue::String);
    }
    if is_instance(env, value, "java/lang/Boolean")? {
        let b = env
            .call_method(value, "booleanValue", "()Z", &[])
            .and_then(|v| v.z())
            .map_err(|e| jni_err(env, "Boolean.booleanValue", e))?;
        return Ok(PrefValue::Bool(b));
    }
    if is_instance(env, value, "java/lang/Integer")? {
        let n = env
            .call_method(value, "intValue", "()I", &[])
            .and_then(|v| v.i())
            .map_err(|e| jni_err(env, "Integer.intValue", e))?;
        return Ok(PrefValue::Int(n));
    }
    if is_instance(env, value, "java/util/Set")? {
        let members = collect_strings(env, value)?;
        return Ok(PrefValue::StringSet(members.into_iter().collect()));
    }

    Err(PrefsError::UnsupportedValue {
        key: key.to_owned(),
        type_name: class_name(env, value)?,
    })
}

fn is_instance(env: &mut JNIEnv<'_>, obj: &JObject<'_>, class: &str) -> Result<bool> {
    env.is_instance_of(obj, class)
        .map_err(|e| jni_err(env, "IsInstanceOf", e))
}

fn java_string(env: &mut JNIEnv<'_>, obj: &JObject<'_>) -> Result<String> {
    // Callers pass objects already known to be `java.lang.String`.
    let j_str: &JString<'_> = obj.into();
    let s: String = env
        .get_string(j_str)
        .map_err(|e| jni_err(env, "get_string", e))?
        .into();
    Ok(s)
}

/// Collect the members of a `java.util.Set<String>` via `toArray()`.
fn collect_strings(env: &mut JNIEnv<'_>, set: &JObject<'_>) -> Result<Vec<String>> {
    let array = env
        .call_method(set, "toArray", "()[Ljava/lang/Object;", &[])
        .and_then(|v| v.l())
        .map_err(|e| jni_err(env, "Set.toArray", e))?;
    let array = JObjectArray::from(array);

    let len = env
        .get_array_length(&array)
        .map_err(|e| jni_err(env, "get_array_length", e))?;

    let mut out = Vec::with_capacity(len.max(0) as usize);
    for i in 0..len {
        let element = env
            .get_object_array_element(&array, i)
            .map_err(|e| jni_err(env, "get_object_array_element", e))?;
        out.push(java_string(env, &element)?);
        env.delete_local_ref(element)
            .map_err(|e| jni_err(env, "delete_local_ref", e))?;
    }
    Ok(out)
}

/// Build a `java.util.HashSet<String>` holding `members`.
fn new_hash_set<'a>(env: &mut JNIEnv<'a>, members: &BTreeSet<String>) -> Result<JObject<'a>> {
    let set = env
        .new_object("java/util/HashSet", "()V", &[])
        .map_err(|e| jni_err(env, "new HashSet", e))?;
    for member in members {
        let j_member = env
            .new_string(member)
            .map_err(|e| jni_err(env, "new_string(member)", e))?;
        env.call_method(
            &set,
            "add",
            "(Ljava/lang/Object;)Z",
            &[JValue::Object(&j_member)],
        )
        .map_err(|e| jni_err(env, "HashSet.add", e))?;
        env.delete_local_ref(j_member)
            .map_err(|e| jni_err(env, "delete_local_ref", e))?;
    }
    Ok(set)
}

fn class_name(env: &mut JNIEnv<'_>, obj: &JObject<'_>) -> Result<String> {
    let class = env
        .call_method(obj, "getClass", "()Ljava/lang/Class;", &[])
        .and_then(|v| v.l())
        .map_err(|e| jni_err(env, "getClass", e))?;
    let name = env
        .call_method(&class, "getName", "()Ljava/lang/String;", &[])
        .and_then(|v| v.l())
        .map_err(|e| jni_err(env, "Class.getName", e))?;
    java_string(env, &name)
}

/// The application's package name, via `Context.getPackageName()`.
fn package_name(env: &mut JNIEnv<'_>, context: &JObject<'_>) -> Result<String> {
    let j_pkg = env
        .call_method(context, "getPackageName", "()Ljava/lang/String;", &[])
        .and_then(|v| v.l())
        .map_err(|e| jni_err(env, "getPackageName", e))?;
    java_string(env, &j_pkg)
}
