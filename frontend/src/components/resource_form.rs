//! 资源表单状态
//!
//! 把核心库的 `ResourceSync` 镜像到信号上：
//! - 会话出现后加载一次记录
//! - 字段编辑只改内存
//! - 提交时校验并整条写回
//! - 组件卸载后到达的结果被忽略

use crate::auth::{AuthContext, RecordStore, use_auth};
use leptos::prelude::*;
use leptos::task::spawn_local;
use seatrack::sync::{Resource, ResourceSync};
use seatrack::{Notice, SyncPhase};
use std::rc::Rc;

type FormSync<R> = ResourceSync<R, RecordStore>;

/// 相等时不替换，返回是否发生了变化
fn replace_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

fn set_if_changed<T: PartialEq + Send + Sync + 'static>(signal: RwSignal<T>, value: T) {
    signal.try_maybe_update(|current| (replace_if_changed(current, value), ()));
}

/// 组件 owner 释放时结束视图生命周期
struct Mounted<R: Resource>(Rc<FormSync<R>>);

impl<R: Resource> Drop for Mounted<R> {
    fn drop(&mut self) {
        self.0.unmount();
    }
}

pub struct FormState<R: Resource + Send + Sync> {
    auth: AuthContext,
    sync: StoredValue<Mounted<R>, LocalStorage>,
    pub fields: RwSignal<R>,
    pub phase: RwSignal<SyncPhase>,
    pub notice: RwSignal<Option<Notice>>,
}

impl<R: Resource + Send + Sync> Clone for FormState<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: Resource + Send + Sync> Copy for FormState<R> {}

impl<R: Resource + Send + Sync> FormState<R> {
    fn handle(&self) -> Option<Rc<FormSync<R>>> {
        self.sync.try_with_value(|m| m.0.clone())
    }

    /// 把核心状态复制到信号，只在值变化时通知
    ///
    /// 提示信号若在每次按键时都被重写，toast 的计时器会被不断重置。
    fn refresh(&self, sync: &FormSync<R>) {
        set_if_changed(self.fields, sync.fields());
        set_if_changed(self.phase, sync.phase());
        set_if_changed(self.notice, sync.notice());
    }

    pub fn field(&self, field: R::Field) -> String {
        self.fields.with(|f| f.field(field))
    }

    pub fn set_field(&self, field: R::Field, value: String) {
        if let Some(sync) = self.handle() {
            sync.set_field(field, value);
            self.refresh(&sync);
        }
    }

    pub fn can_submit(&self) -> bool {
        self.phase.get().can_submit()
    }

    /// 加载或保存期间禁止编辑
    pub fn is_busy(&self) -> bool {
        self.phase.get().is_busy()
    }

    pub fn is_saving(&self) -> bool {
        self.phase.get() == SyncPhase::Saving
    }

    pub fn dismiss(&self) {
        if let Some(sync) = self.handle() {
            sync.dismiss_notice();
            self.refresh(&sync);
        }
    }

    pub fn submit(&self) {
        let Some(sync) = self.handle() else {
            return;
        };
        let Some(session) = self.auth.state.with_untracked(|s| s.session().cloned()) else {
            return;
        };

        let snapshot = sync.prepare_submit();
        self.refresh(&sync);
        let Ok(snapshot) = snapshot else {
            return;
        };

        let form = *self;
        spawn_local(async move {
            // 错误已经记录在提示里
            let _ = sync.commit(&session.identity, snapshot).await;
            if sync.is_mounted() {
                form.refresh(&sync);
            }
        });
    }
}

/// 创建表单状态，并在会话可用时加载记录
pub fn use_resource_form<R: Resource + Send + Sync>() -> FormState<R> {
    let auth = use_auth();
    let sync = Rc::new(FormSync::<R>::new(auth.services().store.clone()));

    let form = FormState {
        auth,
        fields: RwSignal::new(sync.fields()),
        phase: RwSignal::new(sync.phase()),
        notice: RwSignal::new(None),
        sync: StoredValue::new_local(Mounted(sync)),
    };

    // 会话变化时检查是否需要加载（身份可能在挂载之后才解析出来）
    Effect::new(move |_| {
        let session = auth.state.with(|s| s.session().cloned());
        let Some(sync) = form.handle() else {
            return;
        };
        let Some(identity) = sync.watch_identity(session.as_ref()) else {
            return;
        };
        form.refresh(&sync);
        spawn_local(async move {
            let _ = sync.load(&identity).await;
            if sync.is_mounted() {
                form.refresh(&sync);
            }
        });
    });

    form
}

/// 绑定到某个字段的文本输入框
pub fn text_input<R>(form: FormState<R>, field: R::Field, label: &'static str, kind: &'static str, required: bool) -> impl IntoView
where
    R: Resource + Send + Sync,
    R::Field: Send + Sync,
{
    view! {
        <div class="form-control">
            <label class="label">
                <span class="label-text">
                    {label}
                    {required.then_some(" *")}
                </span>
            </label>
            <input
                type=kind
                class="input input-bordered w-full"
                prop:value=move || form.field(field)
                on:input=move |ev| form.set_field(field, event_target_value(&ev))
                disabled=move || form.is_busy()
            />
        </div>
    }
}

/// 提交按钮，只有在可以提交时才可点击
pub fn submit_button<R: Resource + Send + Sync>(form: FormState<R>) -> impl IntoView {
    view! {
        <button type="submit" class="btn btn-primary w-full" disabled=move || !form.can_submit()>
            {move || if form.is_saving() {
                view! { <span class="loading loading-spinner"></span> "Sauvegarde..." }.into_any()
            } else {
                "Sauvegarder".into_any()
            }}
        </button>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seatrack::NoticeKind;

    #[test]
    fn test_unchanged_notice_is_not_replaced() {
        let mut slot = Some(Notice::success("Informations sauvegardées avec succès"));

        assert!(!replace_if_changed(
            &mut slot,
            Some(Notice::success("Informations sauvegardées avec succès"))
        ));
        assert!(replace_if_changed(&mut slot, None));
        assert_eq!(slot, None);
    }

    #[test]
    fn test_changed_value_is_replaced() {
        let mut slot = Some(Notice::success("ok"));
        assert!(replace_if_changed(&mut slot, Some(Notice::error("Erreur lors de la sauvegarde"))));
        assert_eq!(slot.map(|n| n.kind), Some(NoticeKind::Error));

        let mut phase = SyncPhase::Loaded;
        assert!(!replace_if_changed(&mut phase, SyncPhase::Loaded));
        assert!(replace_if_changed(&mut phase, SyncPhase::Dirty));
    }
}
